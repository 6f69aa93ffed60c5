use support_widget_core::intake::{ACCOUNT_NUMBER_DIGITS, SUBMIT_LABEL_IDLE};

use crate::wasm_constants::*;

pub(crate) const WIDGET_STYLESHEET: &str = "\
#ticket-container{flex-direction:column;font-family:sans-serif;}\
#ticket-body{flex:1;padding:15px;overflow-y:auto;background:#f9f9f9;display:flex;flex-direction:column;gap:10px;}\
#ticket-body .msg{padding:10px;border-radius:8px;max-width:80%;word-wrap:break-word;font-size:14px;line-height:1.4;}\
#ticket-body .msg.user{background:#007bff;color:#fff;align-self:flex-end;}\
#ticket-body .msg.admin{background:#e9ecef;color:#333;align-self:flex-start;}\
#ticket-body .form-group{margin-bottom:15px;}\
#ticket-body .form-group label{display:block;margin-bottom:5px;font-size:14px;}\
#ticket-body .form-group input,#ticket-body .form-group textarea{width:100%;padding:8px;box-sizing:border-box;}\
#ticket-body .error-text{color:red;font-size:12px;margin-bottom:10px;display:none;}\
#close-chat{cursor:pointer;padding:0 5px;}";

/// Header, transcript body and the reply footer. The footer stays hidden
/// until a conversation is active.
pub(crate) fn container_markup() -> String {
    format!(
        concat!(
            "<div id=\"ticket-header\">",
            "<span>{title}</span>",
            "<span id=\"{close}\" role=\"button\" tabindex=\"0\" aria-label=\"Close Chat\">x</span>",
            "</div>",
            "<div id=\"{body}\"></div>",
            "<div id=\"{footer}\" style=\"display:none;\">",
            "<input type=\"text\" id=\"{input}\" placeholder=\"Type a reply...\" aria-label=\"Type your message\">",
            "<button id=\"{send}\" type=\"button\">Send</button>",
            "</div>",
        ),
        title = HEADER_TITLE,
        close = CLOSE_CONTROL_ID,
        body = BODY_ID,
        footer = FOOTER_ID,
        input = REPLY_INPUT_ID,
        send = SEND_BUTTON_ID,
    )
}

pub(crate) fn intake_form_markup() -> String {
    format!(
        concat!(
            "<div id=\"{error}\" class=\"error-text\" role=\"alert\"></div>",
            "<div class=\"form-group\"><label for=\"{name}\">Name</label>",
            "<input type=\"text\" id=\"{name}\" required></div>",
            "<div class=\"form-group\"><label for=\"{email}\">Email</label>",
            "<input type=\"email\" id=\"{email}\" required></div>",
            "<div class=\"form-group\"><label for=\"{account}\">Account ({digits} digits)</label>",
            "<input type=\"text\" id=\"{account}\" maxlength=\"{digits}\" inputmode=\"numeric\" pattern=\"[0-9]*\"></div>",
            "<div class=\"form-group\"><label for=\"{description}\">Description</label>",
            "<textarea id=\"{description}\" rows=\"3\" required></textarea></div>",
            "<button id=\"{submit}\" type=\"button\" class=\"btn-submit\">{label}</button>",
        ),
        error = FORM_ERROR_ID,
        name = FORM_NAME_ID,
        email = FORM_EMAIL_ID,
        account = FORM_ACCOUNT_ID,
        digits = ACCOUNT_NUMBER_DIGITS,
        description = FORM_DESCRIPTION_ID,
        submit = FORM_SUBMIT_ID,
        label = SUBMIT_LABEL_IDLE,
    )
}
