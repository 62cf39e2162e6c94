//! Public submission form types — `POST /api/submit`.

use serde::{Deserialize, Serialize};

use advocacy_commons::{Submission, SubmissionKind, ValidationError};

/// Request body for `POST /api/submit`.
///
/// Every field is optional on the wire so that a form missing a field
/// still produces a useful error instead of a JSON decoding failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub submitter_name: Option<String>,
    pub submitter_email: Option<String>,
    pub resource_title: Option<String>,
    pub resource_url: Option<String>,
    pub resource_description: Option<String>,
    pub resource_category: Option<String>,
    pub story_title: Option<String>,
    pub story_person_name: Option<String>,
    pub story_location: Option<String>,
    pub story_summary: Option<String>,
    pub story_body: Option<String>,
}

impl SubmissionRequest {
    /// Convert into a [`Submission`], filling absent fields with `""`.
    ///
    /// Fails with [`ValidationError::InvalidSubmissionType`] unless `type`
    /// is `resource` or `communityStory`.
    pub fn into_submission(self) -> Result<Submission, ValidationError> {
        let kind: SubmissionKind = self
            .kind
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(|_| ValidationError::InvalidSubmissionType)?;
        Ok(Submission {
            kind,
            submitter_name: self.submitter_name.unwrap_or_default(),
            submitter_email: self.submitter_email.unwrap_or_default(),
            resource_title: self.resource_title.unwrap_or_default(),
            resource_url: self.resource_url.unwrap_or_default(),
            resource_description: self.resource_description.unwrap_or_default(),
            resource_category: self.resource_category.unwrap_or_default(),
            story_title: self.story_title.unwrap_or_default(),
            story_person_name: self.story_person_name.unwrap_or_default(),
            story_location: self.story_location.unwrap_or_default(),
            story_summary: self.story_summary.unwrap_or_default(),
            story_body: self.story_body.unwrap_or_default(),
        })
    }
}

impl From<&Submission> for SubmissionRequest {
    fn from(s: &Submission) -> Self {
        let opt = |v: &String| (!v.is_empty()).then(|| v.clone());
        Self {
            kind: Some(s.kind.to_string()),
            submitter_name: opt(&s.submitter_name),
            submitter_email: opt(&s.submitter_email),
            resource_title: opt(&s.resource_title),
            resource_url: opt(&s.resource_url),
            resource_description: opt(&s.resource_description),
            resource_category: opt(&s.resource_category),
            story_title: opt(&s.story_title),
            story_person_name: opt(&s.story_person_name),
            story_location: opt(&s.story_location),
            story_summary: opt(&s.story_summary),
            story_body: opt(&s.story_body),
        }
    }
}

/// Response body for a successful `POST /api/submit`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmitResponse {
    pub success: bool,
    /// Id of the created `submission` document.
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_type_is_invalid() {
        let err = SubmissionRequest::default().into_submission().unwrap_err();
        assert_eq!(err, ValidationError::InvalidSubmissionType);
    }

    #[test]
    fn absent_fields_become_empty_strings() {
        let req: SubmissionRequest = serde_json::from_str(
            r#"{"type":"communityStory","storyTitle":"Getting to work","storyBody":"..."}"#,
        )
        .unwrap();
        let s = req.into_submission().unwrap();
        assert_eq!(s.kind, SubmissionKind::CommunityStory);
        assert_eq!(s.story_title, "Getting to work");
        assert_eq!(s.resource_title, "");
    }
}
