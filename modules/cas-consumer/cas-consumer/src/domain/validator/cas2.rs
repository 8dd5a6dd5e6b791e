//! CAS 2.0 XML validation responses.
//!
//! ```xml
//! <cas:serviceResponse xmlns:cas="http://www.yale.edu/tp/cas">
//!   <cas:authenticationSuccess>
//!     <cas:user>primary</cas:user>
//!     <cas:attributes>
//!       <cas:identifier>alias-1</cas:identifier>
//!       <cas:email>user@example.com</cas:email>
//!     </cas:attributes>
//!   </cas:authenticationSuccess>
//! </cas:serviceResponse>
//! ```

use std::collections::BTreeMap;

use cas_consumer_sdk::{ProtocolVersion, ValidationResult};
use roxmltree::{Document, Node};
use tracing::{debug, info, warn};

use super::TicketValidator;
use crate::domain::error::DomainError;

pub const CAS_NAMESPACE: &str = "http://www.yale.edu/tp/cas";

/// Attribute elements with this local name are alternate account identifiers.
const IDENTIFIER_ATTRIBUTE: &str = "identifier";

#[derive(Debug, Clone, Copy, Default)]
pub struct Cas2Validator;

impl TicketValidator for Cas2Validator {
    fn protocol(&self) -> ProtocolVersion {
        ProtocolVersion::Cas2
    }

    fn parse(&self, body: &[u8]) -> Result<ValidationResult, DomainError> {
        let text = std::str::from_utf8(body)
            .map_err(|e| DomainError::protocol(format!("CAS2 response is not UTF-8: {e}")))?;
        if text.trim().is_empty() {
            debug!("Empty CAS2 response");
            return Ok(ValidationResult::failure());
        }

        let doc = Document::parse(text)
            .map_err(|e| DomainError::protocol(format!("malformed CAS2 response: {e}")))?;

        let root = doc.root_element();
        if !is_cas_element(root, "serviceResponse") {
            debug!(root = root.tag_name().name(), "Not a CAS serviceResponse");
            return Ok(ValidationResult::failure());
        }

        let Some(success) = cas_child(root, "authenticationSuccess") else {
            if let Some(failure) = cas_child(root, "authenticationFailure") {
                info!(
                    code = failure.attribute("code").unwrap_or_default(),
                    message = %text_content(failure),
                    "CAS provider rejected the ticket"
                );
            }
            return Ok(ValidationResult::failure());
        };

        let primary = cas_child(success, "user")
            .map(text_content)
            .unwrap_or_default();
        if primary.is_empty() {
            warn!("CAS2 authenticationSuccess without a user");
            return Ok(ValidationResult::failure());
        }

        let mut secondary = Vec::new();
        let mut attributes = BTreeMap::new();
        if let Some(attrs) = cas_child(success, "attributes") {
            for element in attrs.children().filter(Node::is_element) {
                let name = element.tag_name().name();
                let value = text_content(element);
                if name == IDENTIFIER_ATTRIBUTE {
                    secondary.push(value);
                } else {
                    attributes.insert(name.to_owned(), value);
                }
            }
        }

        let result = ValidationResult::success(&primary, secondary, attributes);
        debug!(
            identifiers = ?result.identifiers(),
            attribute_count = result.attributes().len(),
            "Verified CAS2 response"
        );
        Ok(result)
    }
}

fn is_cas_element(node: Node<'_, '_>, local_name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local_name
        && node.tag_name().namespace() == Some(CAS_NAMESPACE)
}

fn cas_child<'a, 'input>(node: Node<'a, 'input>, local_name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is_cas_element(*n, local_name))
}

fn text_content(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_owned()
}
