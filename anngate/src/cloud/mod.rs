//! Cloud object storage used as an alternative dataset source/destination.
//!
//! Uploads can reference an object in a bucket instead of carrying file
//! bytes, and exports can be written back to a bucket. The [`BucketStore`]
//! trait is the seam; production uses the S3 implementation, tests use an
//! in-memory one.

mod s3;

pub use s3::S3BucketStore;

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::str::FromStr;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum CloudError {
    #[error("object \"{key}\" not found in bucket \"{bucket}\"")]
    ObjectNotFound { bucket: String, key: String },

    #[error("bucket \"{bucket}\" not found")]
    BucketNotFound { bucket: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Object storage interface.
#[async_trait]
pub trait BucketStore: Send + Sync {
    /// Fetch an object's bytes.
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Bytes, CloudError>;

    /// Write an object, replacing any existing content.
    async fn put(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), CloudError>;

    /// Delete an object. Deleting a missing object is not an error.
    async fn delete(&self, bucket: &str, key: &str) -> Result<(), CloudError>;
}

/// A `<bucket>/<key>` path as supplied in the `bucket` form field.
///
/// The key may itself contain slashes; only the first segment names the
/// bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketPath {
    pub bucket: String,
    pub key: String,
}

#[derive(Debug, ThisError)]
#[error("bucket path {0:?} is invalid, expected \"<bucket>/<object-key>\"")]
pub struct InvalidBucketPath(String);

impl FromStr for BucketPath {
    type Err = InvalidBucketPath;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => Ok(Self {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
            _ => Err(InvalidBucketPath(s.to_string())),
        }
    }
}

impl fmt::Display for BucketPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_path_parses_nested_keys() {
        let path: BucketPath = "corpora/2026/train.jsonl".parse().unwrap();
        assert_eq!(path.bucket, "corpora");
        assert_eq!(path.key, "2026/train.jsonl");
        assert_eq!(path.to_string(), "corpora/2026/train.jsonl");
    }

    #[test]
    fn bucket_path_requires_bucket_and_key() {
        assert!("corpora".parse::<BucketPath>().is_err());
        assert!("corpora/".parse::<BucketPath>().is_err());
        assert!("/train.jsonl".parse::<BucketPath>().is_err());
    }
}
