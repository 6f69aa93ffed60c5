#![allow(clippy::needless_pass_by_value)]

#[cfg(any(target_arch = "wasm32", test))]
mod keys;
#[cfg(any(target_arch = "wasm32", test))]
mod mount_options;
#[cfg(any(target_arch = "wasm32", test))]
mod templates;
#[cfg(any(target_arch = "wasm32", test))]
mod wasm_constants;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::thread::LocalKey;

    use support_widget_core::{
        ConversationId, IntakeForm, PollOutcome, SupportWidget, SupportWidgetController,
    };
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::HtmlElement;

    use crate::keys::{is_activation_key, is_submit_key};
    use crate::mount_options::resolve_mount_config;
    use crate::templates::{WIDGET_STYLESHEET, container_markup, intake_form_markup};
    use crate::wasm_constants::*;

    mod dom;
    mod network;
    mod storage;
    mod timer;

    use dom::{DomWidgetView, ensure_widget_dom};
    use network::GlooSupportGateway;
    use storage::LocalStorageSessionStore;
    use timer::IntervalPollScheduler;

    type WebController = SupportWidgetController<
        LocalStorageSessionStore,
        IntervalPollScheduler,
        DomWidgetView,
        GlooSupportGateway,
    >;

    /// A listener together with the target it was attached to, so it can be
    /// detached before its replacement is attached.
    struct BoundListener {
        target: web_sys::EventTarget,
        event: &'static str,
        callback: Closure<dyn FnMut(web_sys::Event)>,
    }

    type HandlerSlot = LocalKey<RefCell<Option<BoundListener>>>;

    thread_local! {
        static CONTROLLER: RefCell<Option<Rc<WebController>>> = const { RefCell::new(None) };
        static TOGGLE_CLICK_HANDLER: RefCell<Option<BoundListener>> = const { RefCell::new(None) };
        static CLOSE_CLICK_HANDLER: RefCell<Option<BoundListener>> = const { RefCell::new(None) };
        static CLOSE_KEYDOWN_HANDLER: RefCell<Option<BoundListener>> = const { RefCell::new(None) };
        static INTAKE_SUBMIT_HANDLER: RefCell<Option<BoundListener>> = const { RefCell::new(None) };
        static SEND_CLICK_HANDLER: RefCell<Option<BoundListener>> = const { RefCell::new(None) };
        static INPUT_KEYDOWN_HANDLER: RefCell<Option<BoundListener>> = const { RefCell::new(None) };
    }

    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();
        if let Err(error) = mount(None) {
            log_error(&format!("support widget failed to mount: {error}"));
        }
    }

    /// Mounts (or remounts) the widget against `base_url`. Without an
    /// argument the page global and then the local default are used.
    #[wasm_bindgen]
    pub fn mount_support_widget(base_url: Option<String>) -> Result<(), JsValue> {
        mount(base_url.as_deref()).map_err(|error| JsValue::from_str(&error))
    }

    fn mount(base_url: Option<&str>) -> Result<(), String> {
        let window = web_sys::window().ok_or_else(|| "window is unavailable".to_string())?;
        let page_global = js_sys::Reflect::get(&window, &JsValue::from_str(BASE_URL_GLOBAL))
            .ok()
            .and_then(|value| value.as_string());
        let (config, source) = resolve_mount_config(base_url, page_global.as_deref())
            .map_err(|error| error.to_string())?;
        let elements = ensure_widget_dom(&window)?;

        if let Some(previous) = CONTROLLER.with(|slot| slot.borrow_mut().take()) {
            previous.close();
        }

        let widget = SupportWidget::new(
            LocalStorageSessionStore::new(config.storage_key.clone()),
            IntervalPollScheduler,
            DomWidgetView::new(elements.clone()),
            config.poll_interval,
        );
        let controller = Rc::new(SupportWidgetController::new(
            widget,
            GlooSupportGateway::new(&config),
        ));
        CONTROLLER.with(|slot| *slot.borrow_mut() = Some(controller));

        bind_listener(&TOGGLE_CLICK_HANDLER, &elements.toggle, "click", |_event| {
            toggle_widget();
        });
        bind_listener(&CLOSE_CLICK_HANDLER, &elements.close, "click", |_event| {
            close_widget();
        });
        bind_listener(&CLOSE_KEYDOWN_HANDLER, &elements.close, "keydown", |event| {
            let Some(event) = event.dyn_ref::<web_sys::KeyboardEvent>() else {
                return;
            };
            if is_activation_key(&event.key()) {
                event.prevent_default();
                close_widget();
            }
        });

        web_sys::console::info_1(&JsValue::from_str(&format!(
            "support widget mounted base_url={} source={}",
            config.base_url,
            source.as_str()
        )));
        Ok(())
    }

    fn bind_listener(
        slot: &'static HandlerSlot,
        target: &web_sys::EventTarget,
        event: &'static str,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) {
        unbind_listener(slot);
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(handler));
        let _ = target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref());
        slot.with(|slot| {
            *slot.borrow_mut() = Some(BoundListener {
                target: target.clone(),
                event,
                callback,
            });
        });
    }

    fn unbind_listener(slot: &'static HandlerSlot) {
        let Some(previous) = slot.with(|slot| slot.borrow_mut().take()) else {
            return;
        };
        let _ = previous.target.remove_event_listener_with_callback(
            previous.event,
            previous.callback.as_ref().unchecked_ref(),
        );
    }

    fn current_controller() -> Option<Rc<WebController>> {
        CONTROLLER.with(|slot| slot.borrow().clone())
    }

    fn toggle_widget() {
        let Some(controller) = current_controller() else {
            return;
        };
        spawn_local(async move {
            if let Some(outcome) = controller.toggle().await {
                report_poll_outcome(outcome);
            }
        });
    }

    fn close_widget() {
        if let Some(controller) = current_controller() {
            controller.close();
        }
    }

    fn submit_intake(form: IntakeForm) {
        let Some(controller) = current_controller() else {
            return;
        };
        spawn_local(async move {
            controller.submit_intake(&form).await;
        });
    }

    fn send_reply(conversation_id: ConversationId, text: String) {
        let Some(controller) = current_controller() else {
            return;
        };
        spawn_local(async move {
            controller.submit_reply(&conversation_id, &text).await;
        });
    }

    fn poll_tick(conversation_id: ConversationId) {
        let Some(controller) = current_controller() else {
            return;
        };
        spawn_local(async move {
            let outcome = controller.refresh(&conversation_id).await;
            report_poll_outcome(outcome);
        });
    }

    fn report_poll_outcome(outcome: PollOutcome) {
        if outcome == PollOutcome::TransientFailure {
            log_error("Polling error: history fetch failed; retrying on next tick");
        }
    }

    fn log_error(message: &str) {
        web_sys::console::error_1(&JsValue::from_str(message));
    }
}
