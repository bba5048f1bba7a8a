//! SOAP envelopes and response parsing for the EDocs web service.

use tracing::warn;

use crate::xml::{parse_document, XmlBuilder, XmlElement, XmlError};

use super::types::{ClientError, DocumentRef};

pub const SERVICE_NAMESPACE: &str = "http://www.lendersoffice.com/los/webservices/";
pub const SERVICE_PATH: &str = "/los/webservice/EDocsService.asmx";
const SOAP_ENVELOPE_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// EDocs operations used by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoapOperation {
    ListEdocsByLoanNumber,
    DownloadEdocsPdfById,
    UploadPdfDocument,
}

impl SoapOperation {
    pub fn name(&self) -> &'static str {
        match self {
            SoapOperation::ListEdocsByLoanNumber => "ListEdocsByLoanNumber",
            SoapOperation::DownloadEdocsPdfById => "DownloadEdocsPdfById",
            SoapOperation::UploadPdfDocument => "UploadPDFDocument",
        }
    }

    /// Metric label for the operation.
    pub fn label(&self) -> &'static str {
        match self {
            SoapOperation::ListEdocsByLoanNumber => "list_documents",
            SoapOperation::DownloadEdocsPdfById => "download_document",
            SoapOperation::UploadPdfDocument => "upload_document",
        }
    }

    /// Value of the `SOAPAction` header, quoted.
    pub fn soap_action(&self) -> String {
        format!("\"{}{}\"", SERVICE_NAMESPACE, self.name())
    }

    fn result_element(&self) -> String {
        format!("{}Result", self.name())
    }
}

/// Build a request envelope. Parameter values are escaped.
pub fn build_envelope(
    operation: SoapOperation,
    parameters: &[(&str, &str)],
) -> Result<String, XmlError> {
    let operation_tag = format!("los:{}", operation.name());

    let mut builder = XmlBuilder::new()?;
    builder
        .open(
            "soap:Envelope",
            &[
                ("xmlns:soap", SOAP_ENVELOPE_NAMESPACE),
                ("xmlns:los", SERVICE_NAMESPACE),
            ],
        )?
        .open("soap:Body", &[])?
        .open(&operation_tag, &[])?;
    for (name, value) in parameters {
        builder.text_element(&format!("los:{}", name), value)?;
    }
    builder
        .close(&operation_tag)?
        .close("soap:Body")?
        .close("soap:Envelope")?;
    Ok(builder.finish())
}

/// Pull the `<Operation>Result` element out of a response envelope.
///
/// A SOAP fault becomes [`ClientError::Upstream`]; a missing result element
/// yields `None`.
pub fn extract_result(
    body: &str,
    operation: SoapOperation,
) -> Result<Option<XmlElement>, ClientError> {
    let envelope = parse_document(body).map_err(|e| ClientError::Parse(e.to_string()))?;

    if let Some(fault) = envelope.find("Fault") {
        let reason = fault
            .value_of(&["faultstring", "Reason", "faultcode"])
            .map(str::to_string)
            .or_else(|| fault.find("Text").map(|t| t.text().to_string()))
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| "SOAP fault".to_string());
        return Err(ClientError::Upstream(format!(
            "{} fault: {}",
            operation.name(),
            reason
        )));
    }

    Ok(envelope.find(&operation.result_element()).cloned())
}

/// Extract document metadata from a list result.
///
/// The result may carry the list as embedded elements or as an escaped XML
/// string. An unparseable string is treated as an empty list.
pub fn parse_document_list(result: &XmlElement) -> Vec<DocumentRef> {
    if !result.children.is_empty() {
        return documents_in(result);
    }

    let raw = result.text();
    if raw.is_empty() {
        return Vec::new();
    }

    match parse_document(raw) {
        Ok(inner) => documents_in(&inner),
        Err(e) => {
            warn!(error = %e, "Could not parse document list, treating it as empty");
            Vec::new()
        }
    }
}

const LIST_SHAPES: [(&str, &str); 3] = [
    ("EDocs", "EDoc"),
    ("edocs", "edoc"),
    ("DocumentList", "Document"),
];

fn documents_in(node: &XmlElement) -> Vec<DocumentRef> {
    for (container, item) in LIST_SHAPES {
        if node.name == container {
            return node.children_named(item).map(document_ref).collect();
        }
        if let Some(list) = node.child(container) {
            return list.children_named(item).map(document_ref).collect();
        }
    }
    node.children.iter().map(document_ref).collect()
}

fn document_ref(entry: &XmlElement) -> DocumentRef {
    let field = |names: &[&str]| entry.value_of(names).unwrap_or_default().to_string();

    DocumentRef {
        guid: field(&["docid", "GUID", "guid", "DocumentId"]),
        name: field(&["Name", "DocumentName", "name", "doc_type"]),
        doc_type: field(&["Type", "DocumentType", "doc_type", "type"]),
        folder: field(&["folder_name", "Folder", "folder"]),
        date_modified: field(&["DateModified", "date_modified", "LastModified"]),
        size: entry
            .value_of(&["Size", "size"])
            .and_then(|s| s.parse().ok())
            .unwrap_or(0),
    }
}
