use crate::{
    models::{
        appraisal::Identification,
        openai::{InputContent, ResponsesRequest},
    },
    schema::StructuredOutput,
};

const IDENTIFY_INSTRUCTIONS: &str = "You are a luxury goods identification assistant.\n\
Use the images, the user description, and the classifier hint (may be wrong).\n\
Return structured fields for brand/model/category, aliases, attributes, confidence, price range, market value,\n\
suggested search queries, and a short rationale.\n\
Rules: do not fabricate stamps/serials; if not visible, say 'not visible'.";

/// Inputs to the identification step
#[derive(Debug, Clone, Default)]
pub struct IdentifyInput {
    /// Embeddable image references (data: or http(s) URLs)
    pub image_urls: Vec<String>,
    pub description: Option<String>,
    pub classifier_hint: Option<String>,
}

impl IdentifyInput {
    pub fn from_images(image_urls: Vec<String>) -> Self {
        Self {
            image_urls,
            ..Default::default()
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Build the identification request: instructions, optional text, then images
pub fn build_identify_request(model: &str, input: &IdentifyInput) -> ResponsesRequest {
    let mut content = vec![InputContent::text(IDENTIFY_INSTRUCTIONS)];

    if let Some(description) = non_blank(&input.description) {
        content.push(InputContent::text(format!("User description:\n{}", description)));
    }
    if let Some(hint) = non_blank(&input.classifier_hint) {
        content.push(InputContent::text(format!("Classifier hint:\n{}", hint)));
    }

    content.extend(input.image_urls.iter().cloned().map(InputContent::image));

    ResponsesRequest::user(model, content).with_format(Identification::response_format())
}
