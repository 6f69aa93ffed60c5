fn main() -> anyhow::Result<()> {
    support_chat_cli::run()
}
