//! Launch request parsing and response rendering.

use crate::xml::{escape_xml, parse_document, XmlBuilder, XmlElement, XmlError};

use super::types::{HandshakeError, LaunchRequest};

pub const REQUEST_ROOT: &str = "LQBGenericFrameworkRequest";
pub const RESPONSE_ROOT: &str = "LQBGenericFrameworkResponse";

/// Pop-up window dimensions requested from the platform.
const WINDOW_HEIGHT: &str = "850";
const WINDOW_WIDTH: &str = "650";

/// Hand-written reply used if rendering itself fails.
pub const FALLBACK_ERROR_RESPONSE: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
<LQBGenericFrameworkResponse><Error>Server error</Error></LQBGenericFrameworkResponse>";

/// Parse and validate a launch request body.
pub fn parse_launch_request(body: Option<&str>) -> Result<LaunchRequest, HandshakeError> {
    let body = body
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .ok_or(HandshakeError::MissingBody)?;

    let root = parse_document(body).map_err(|e| match e {
        XmlError::NoRoot => HandshakeError::InvalidRoot,
        other => HandshakeError::Malformed(other.to_string()),
    })?;
    if root.name != REQUEST_ROOT {
        return Err(HandshakeError::InvalidRoot);
    }

    let loan_number = root
        .child_text("LoanNumber")
        .filter(|l| !l.is_empty())
        .ok_or(HandshakeError::MissingLoanNumber)?
        .to_string();

    let encrypted_ticket = root
        .child("LendingQBLoanCredential")
        .and_then(|c| c.child("GENERIC_FRAMEWORK_USER_TICKET"))
        .and_then(|t| t.value("EncryptedTicket"))
        .unwrap_or_default()
        .to_string();

    let (vendor_username, vendor_account_id) = root
        .child("CredentialXML")
        .and_then(vendor_credentials)
        .unwrap_or_default();

    Ok(LaunchRequest {
        loan_number,
        user_login: root.child_text("UserLogin").unwrap_or_default().to_string(),
        encrypted_ticket,
        vendor_username,
        vendor_account_id,
    })
}

/// Vendor credentials, embedded either as elements or as escaped XML text.
fn vendor_credentials(container: &XmlElement) -> Option<(String, String)> {
    let extract = |credentials: &XmlElement| {
        (
            credentials.value("username").unwrap_or_default().to_string(),
            credentials.value("accountID").unwrap_or_default().to_string(),
        )
    };

    if let Some(credentials) = container.child("credentials") {
        return Some(extract(credentials));
    }

    let embedded = container.text();
    if embedded.is_empty() {
        return None;
    }
    parse_document(embedded)
        .ok()
        .and_then(|inner| inner.find("credentials").map(extract))
}

/// Success reply instructing the platform to open `url` in a pop-up.
pub fn render_window_response(url: &str) -> Result<String, XmlError> {
    let mut builder = XmlBuilder::new()?;
    builder
        .open(RESPONSE_ROOT, &[])?
        .empty(
            "Window",
            &[
                ("url", url),
                ("height", WINDOW_HEIGHT),
                ("width", WINDOW_WIDTH),
                ("modalIndicator", "Y"),
            ],
        )?
        .close(RESPONSE_ROOT)?;
    Ok(builder.finish())
}

pub fn render_error_response(message: &str) -> Result<String, XmlError> {
    let mut builder = XmlBuilder::new()?;
    builder
        .open(RESPONSE_ROOT, &[])?
        .text_element("Error", message)?
        .close(RESPONSE_ROOT)?;
    Ok(builder.finish())
}

/// Wrap a launch ticket in the credential element the document service
/// expects as `sTicket`.
pub fn render_ticket_credential(ticket: &str) -> String {
    format!(
        "<GENERIC_FRAMEWORK_USER_TICKET EncryptedTicket=\"{}\" />",
        escape_xml(ticket)
    )
}
