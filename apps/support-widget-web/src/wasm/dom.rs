use super::*;

use support_widget_core::intake::{SUBMIT_LABEL_BUSY, SUBMIT_LABEL_IDLE};
use support_widget_core::{IntakeSurface, Message, ReplySurface, TranscriptSurface, WidgetView};
use web_sys::{Document, HtmlButtonElement, HtmlInputElement, HtmlTextAreaElement, Window};

/// Elements that live for the whole page. Form fields are looked up on
/// demand because the form markup is rebuilt each time it is shown.
#[derive(Clone)]
pub(super) struct WidgetElements {
    pub(super) toggle: HtmlElement,
    pub(super) container: HtmlElement,
    pub(super) close: HtmlElement,
    pub(super) body: HtmlElement,
    pub(super) footer: HtmlElement,
    pub(super) input: HtmlInputElement,
    pub(super) send: HtmlElement,
}

pub(super) fn ensure_widget_dom(window: &Window) -> Result<WidgetElements, String> {
    let document = window
        .document()
        .ok_or_else(|| "document is unavailable".to_string())?;
    let body = document
        .body()
        .ok_or_else(|| "document body is unavailable".to_string())?;

    if document.get_element_by_id(STYLE_ID).is_none() {
        let style = document
            .create_element("style")
            .map_err(|_| "failed to create widget stylesheet".to_string())?;
        style.set_id(STYLE_ID);
        style.set_text_content(Some(WIDGET_STYLESHEET));
        let appended = match document.head() {
            Some(head) => head.append_child(&style),
            None => body.append_child(&style),
        };
        appended.map_err(|_| "failed to append widget stylesheet".to_string())?;
    }

    if document.get_element_by_id(TOGGLE_BUTTON_ID).is_none() {
        let toggle = create_html_element(&document, "button")?;
        toggle.set_id(TOGGLE_BUTTON_ID);
        toggle.set_inner_text(TOGGLE_LABEL);
        let _ = toggle.set_attribute("type", "button");
        let _ = toggle.set_attribute("aria-label", TOGGLE_ARIA_LABEL);
        set_styles(
            &toggle,
            &[
                ("position", "fixed"),
                ("bottom", "20px"),
                ("right", "20px"),
                ("z-index", "9999"),
                ("padding", "15px"),
                ("background", "#007bff"),
                ("color", "#ffffff"),
                ("border", "none"),
                ("border-radius", "50px"),
                ("cursor", "pointer"),
            ],
        )?;
        body.append_child(&toggle)
            .map_err(|_| "failed to append support toggle".to_string())?;
    }

    if document.get_element_by_id(CONTAINER_ID).is_none() {
        let container = create_html_element(&document, "div")?;
        container.set_id(CONTAINER_ID);
        let _ = container.set_attribute("role", "dialog");
        let _ = container.set_attribute("aria-modal", "true");
        set_styles(
            &container,
            &[
                ("position", "fixed"),
                ("bottom", "80px"),
                ("right", "20px"),
                ("width", "350px"),
                ("height", "500px"),
                ("background", "#ffffff"),
                ("border", "1px solid #cccccc"),
                ("border-radius", "10px"),
                ("z-index", "9999"),
                ("display", "none"),
            ],
        )?;
        container.set_inner_html(&container_markup());
        body.append_child(&container)
            .map_err(|_| "failed to append support container".to_string())?;
    }

    Ok(WidgetElements {
        toggle: element_by_id(&document, TOGGLE_BUTTON_ID)?,
        container: element_by_id(&document, CONTAINER_ID)?,
        close: element_by_id(&document, CLOSE_CONTROL_ID)?,
        body: element_by_id(&document, BODY_ID)?,
        footer: element_by_id(&document, FOOTER_ID)?,
        input: element_by_id(&document, REPLY_INPUT_ID)?,
        send: element_by_id(&document, SEND_BUTTON_ID)?,
    })
}

fn create_html_element(document: &Document, tag: &str) -> Result<HtmlElement, String> {
    document
        .create_element(tag)
        .map_err(|_| format!("failed to create <{tag}>"))?
        .dyn_into::<HtmlElement>()
        .map_err(|_| format!("<{tag}> is not HtmlElement"))
}

fn element_by_id<T: JsCast>(document: &Document, id: &str) -> Result<T, String> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| format!("missing #{id}"))?
        .dyn_into::<T>()
        .map_err(|_| format!("#{id} has an unexpected element type"))
}

fn set_styles(element: &HtmlElement, styles: &[(&str, &str)]) -> Result<(), String> {
    let style = element.style();
    for (property, value) in styles {
        style
            .set_property(property, value)
            .map_err(|_| format!("failed to set {property} on #{}", element.id()))?;
    }
    Ok(())
}

fn current_document() -> Option<Document> {
    web_sys::window().and_then(|window| window.document())
}

fn form_element<T: JsCast>(id: &str) -> Option<T> {
    current_document()?.get_element_by_id(id)?.dyn_into::<T>().ok()
}

fn input_value(id: &str) -> String {
    form_element::<HtmlInputElement>(id)
        .map(|input| input.value())
        .unwrap_or_default()
}

fn read_intake_form() -> IntakeForm {
    IntakeForm {
        name: input_value(FORM_NAME_ID),
        email: input_value(FORM_EMAIL_ID),
        account: input_value(FORM_ACCOUNT_ID),
        description: form_element::<HtmlTextAreaElement>(FORM_DESCRIPTION_ID)
            .map(|textarea| textarea.value())
            .unwrap_or_default(),
    }
}

pub(super) struct DomWidgetView {
    elements: WidgetElements,
}

impl DomWidgetView {
    pub(super) fn new(elements: WidgetElements) -> Self {
        Self { elements }
    }

    fn set_display(element: &HtmlElement, display: &str) {
        let _ = element.style().set_property("display", display);
    }
}

impl TranscriptSurface for DomWidgetView {
    fn replace_transcript(&mut self, markup: &str, _messages: &[Message]) {
        self.elements.body.set_inner_html(markup);
    }

    fn scroll_transcript_to_latest(&mut self) {
        let body = &self.elements.body;
        body.set_scroll_top(body.scroll_height());
    }
}

impl IntakeSurface for DomWidgetView {
    fn show_intake_error(&mut self, message: &str) {
        if let Some(error) = form_element::<HtmlElement>(FORM_ERROR_ID) {
            error.set_inner_text(message);
            Self::set_display(&error, "block");
        }
    }

    fn clear_intake_error(&mut self) {
        if let Some(error) = form_element::<HtmlElement>(FORM_ERROR_ID) {
            Self::set_display(&error, "none");
        }
    }

    fn set_intake_submitting(&mut self, submitting: bool) {
        if let Some(button) = form_element::<HtmlButtonElement>(FORM_SUBMIT_ID) {
            button.set_disabled(submitting);
            button.set_inner_text(if submitting {
                SUBMIT_LABEL_BUSY
            } else {
                SUBMIT_LABEL_IDLE
            });
        }
    }
}

impl ReplySurface for DomWidgetView {
    fn bind_reply_actions(&mut self, conversation_id: &ConversationId) {
        let click_id = conversation_id.clone();
        let click_input = self.elements.input.clone();
        bind_listener(&SEND_CLICK_HANDLER, &self.elements.send, "click", move |_event| {
            send_reply(click_id.clone(), click_input.value());
        });

        let key_id = conversation_id.clone();
        let key_input = self.elements.input.clone();
        bind_listener(
            &INPUT_KEYDOWN_HANDLER,
            &self.elements.input,
            "keydown",
            move |event| {
                let Some(event) = event.dyn_ref::<web_sys::KeyboardEvent>() else {
                    return;
                };
                if is_submit_key(&event.key(), event.shift_key()) {
                    event.prevent_default();
                    send_reply(key_id.clone(), key_input.value());
                }
            },
        );
    }

    fn unbind_reply_actions(&mut self) {
        unbind_listener(&SEND_CLICK_HANDLER);
        unbind_listener(&INPUT_KEYDOWN_HANDLER);
    }

    fn set_reply_enabled(&mut self, enabled: bool) {
        self.elements.input.set_disabled(!enabled);
    }

    fn clear_reply_input(&mut self) {
        self.elements.input.set_value("");
    }

    fn focus_reply_input(&mut self) {
        let _ = self.elements.input.focus();
    }

    fn notify_send_failure(&mut self, message: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }
}

impl WidgetView for DomWidgetView {
    fn show_closed(&mut self) {
        unbind_listener(&INTAKE_SUBMIT_HANDLER);
        Self::set_display(&self.elements.container, "none");
    }

    fn show_intake_form(&mut self) {
        Self::set_display(&self.elements.container, "flex");
        Self::set_display(&self.elements.footer, "none");
        self.elements.body.set_inner_html(&intake_form_markup());

        let Some(submit) = form_element::<HtmlElement>(FORM_SUBMIT_ID) else {
            return;
        };
        bind_listener(&INTAKE_SUBMIT_HANDLER, &submit, "click", |_event| {
            submit_intake(read_intake_form());
        });
    }

    fn show_chat(&mut self, _conversation_id: &ConversationId) {
        unbind_listener(&INTAKE_SUBMIT_HANDLER);
        Self::set_display(&self.elements.container, "flex");
        Self::set_display(&self.elements.footer, "flex");
        self.elements.body.set_inner_html("");
    }

    fn focus_toggle(&mut self) {
        let _ = self.elements.toggle.focus();
    }
}
