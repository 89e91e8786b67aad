//! `xl/comments*.xml` schema structures.
//!
//! A comments part holds an author list and a list of comments keyed by
//! cell reference; comment text reuses the shared-strings rich text shape.

use serde::{Deserialize, Serialize};

use crate::namespaces;
use crate::shared_strings::{RichRunXml, Text};

/// Comments root element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "comments")]
pub struct CommentsXml {
    #[serde(rename = "@xmlns", default = "namespaces::spreadsheet_ml")]
    pub xmlns: String,

    #[serde(rename = "authors")]
    pub authors: Authors,

    #[serde(rename = "commentList")]
    pub comment_list: CommentList,
}

impl Default for CommentsXml {
    fn default() -> Self {
        Self {
            xmlns: namespaces::SPREADSHEET_ML.to_string(),
            authors: Authors { authors: vec![] },
            comment_list: CommentList { comments: vec![] },
        }
    }
}

/// Author list; comments refer to authors by index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Authors {
    #[serde(rename = "author", default)]
    pub authors: Vec<String>,
}

/// Comment list container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentList {
    #[serde(rename = "comment", default)]
    pub comments: Vec<CommentXml>,
}

/// One comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentXml {
    #[serde(rename = "@ref")]
    pub reference: String,

    #[serde(rename = "@authorId")]
    pub author_id: u32,

    #[serde(rename = "text")]
    pub text: CommentText,
}

/// Comment text: plain or rich runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentText {
    #[serde(rename = "t", skip_serializing_if = "Option::is_none")]
    pub t: Option<Text>,

    #[serde(rename = "r", default)]
    pub runs: Vec<RichRunXml>,
}

impl CommentText {
    pub fn plain_text(&self) -> String {
        match &self.t {
            Some(t) => t.value.clone(),
            None => self.runs.iter().map(|r| r.t.value.as_str()).collect(),
        }
    }
}
