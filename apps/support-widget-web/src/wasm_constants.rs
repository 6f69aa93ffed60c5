pub(crate) const TOGGLE_BUTTON_ID: &str = "ticket-widget-btn";
pub(crate) const TOGGLE_LABEL: &str = "Support";
pub(crate) const TOGGLE_ARIA_LABEL: &str = "Open Support Chat";
pub(crate) const CONTAINER_ID: &str = "ticket-container";
pub(crate) const HEADER_TITLE: &str = "Support Chat";
pub(crate) const CLOSE_CONTROL_ID: &str = "close-chat";
pub(crate) const BODY_ID: &str = "ticket-body";
pub(crate) const FOOTER_ID: &str = "ticket-footer";
pub(crate) const REPLY_INPUT_ID: &str = "chat-input";
pub(crate) const SEND_BUTTON_ID: &str = "send-reply";
pub(crate) const STYLE_ID: &str = "ticket-widget-style";

pub(crate) const FORM_ERROR_ID: &str = "form-error";
pub(crate) const FORM_NAME_ID: &str = "t-name";
pub(crate) const FORM_EMAIL_ID: &str = "t-email";
pub(crate) const FORM_ACCOUNT_ID: &str = "t-account";
pub(crate) const FORM_DESCRIPTION_ID: &str = "t-desc";
pub(crate) const FORM_SUBMIT_ID: &str = "submit-ticket";

/// Host pages may set this global before the module loads.
pub(crate) const BASE_URL_GLOBAL: &str = "__SUPPORT_WIDGET_BASE_URL__";
