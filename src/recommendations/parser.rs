use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::recommendations::repo_types::RecommendationList;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("parse failed: no JSON object in model output")]
    NoJsonObject,

    #[error("parse failed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Extracts the recommendation list from free-form model output.
///
/// Takes the span from the first `{` to the last `}` and decodes it as a
/// whole. Several unrelated objects in one reply therefore fail to decode
/// instead of being disambiguated.
pub fn parse_recommendations(text: &str) -> Result<RecommendationList, ParseError> {
    lazy_static! {
        static ref JSON_OBJECT_RE: Regex = Regex::new(r"\{[\s\S]*\}").unwrap();
    }
    let span = JSON_OBJECT_RE
        .find(text)
        .ok_or(ParseError::NoJsonObject)?;
    Ok(serde_json::from_str(span.as_str())?)
}
