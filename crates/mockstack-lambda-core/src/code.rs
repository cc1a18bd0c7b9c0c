//! Deployment package handling.
//!
//! The emulator never unpacks or runs code. A zip upload is decoded only to
//! compute `CodeSha256` and `CodeSize`; S3 and image sources are recorded by
//! reference.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use mockstack_core::ids;
use mockstack_lambda_model::LambdaError;
use mockstack_lambda_model::types::{FunctionCode, FunctionCodeLocation, PackageType};
use sha2::{Digest, Sha256};

use crate::config::LambdaConfig;

const ZIP_MAGIC: &[u8] = b"PK";

/// Hash, size and download location of a stored package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PackagedCode {
    pub sha256: String,
    pub size: i64,
    pub location: FunctionCodeLocation,
}

/// Base64 of the SHA-256 digest, as Lambda reports `CodeSha256`.
fn code_sha256(bytes: &[u8]) -> String {
    STANDARD.encode(Sha256::digest(bytes).as_slice())
}

fn snapshot_location(config: &LambdaConfig, function_name: &str) -> FunctionCodeLocation {
    let region = &config.default_region;
    FunctionCodeLocation {
        repository_type: "S3".to_owned(),
        location: Some(format!(
            "https://awslambda-{region}-tasks.s3.{region}.amazonaws.com/snapshots/{}/{function_name}-{}",
            config.account_id,
            ids::short_hex_id(8)
        )),
        image_uri: None,
    }
}

/// Resolve the package of a create or update request.
pub(crate) fn package(
    code: &FunctionCode,
    package_type: PackageType,
    function_name: &str,
    config: &LambdaConfig,
) -> Result<PackagedCode, LambdaError> {
    if package_type == PackageType::Image {
        let image_uri = code.image_uri.as_deref().ok_or_else(|| {
            LambdaError::invalid_parameter("ImageUri must be specified for Image package type.")
        })?;
        return Ok(PackagedCode {
            sha256: code_sha256(image_uri.as_bytes()),
            size: 0,
            location: FunctionCodeLocation {
                repository_type: "ECR".to_owned(),
                location: None,
                image_uri: Some(image_uri.to_owned()),
            },
        });
    }

    if let Some(zip) = &code.zip_file {
        let bytes = STANDARD.decode(zip.trim()).map_err(|e| {
            LambdaError::invalid_parameter(
                "Could not unzip uploaded file. Please check your file, then try to upload again.",
            )
            .with_source(e)
        })?;
        if !bytes.starts_with(ZIP_MAGIC) {
            return Err(LambdaError::invalid_parameter(
                "Could not unzip uploaded file. Please check your file, then try to upload again.",
            ));
        }
        let size = i64::try_from(bytes.len()).unwrap_or(i64::MAX);
        return Ok(PackagedCode {
            sha256: code_sha256(&bytes),
            size,
            location: snapshot_location(config, function_name),
        });
    }

    if let (Some(bucket), Some(key)) = (&code.s3_bucket, &code.s3_key) {
        let reference = match &code.s3_object_version {
            Some(version) => format!("s3://{bucket}/{key}?versionId={version}"),
            None => format!("s3://{bucket}/{key}"),
        };
        return Ok(PackagedCode {
            sha256: code_sha256(reference.as_bytes()),
            size: 0,
            location: snapshot_location(config, function_name),
        });
    }

    Err(LambdaError::invalid_parameter(
        "Please provide a source for function code.",
    ))
}

/// `LastModified` timestamp format: `2024-01-01T00:00:00.000+0000`.
pub(crate) fn last_modified_now() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3f+0000")
        .to_string()
}

#[cfg(test)]
mod tests {
    use mockstack_lambda_model::LambdaErrorCode;

    use super::*;

    fn zip_code(bytes: &[u8]) -> FunctionCode {
        FunctionCode {
            zip_file: Some(STANDARD.encode(bytes)),
            ..FunctionCode::default()
        }
    }

    #[test]
    fn test_should_hash_zip_payload() {
        let payload = b"PK\x03\x04hello";
        let packaged = package(
            &zip_code(payload),
            PackageType::Zip,
            "f",
            &LambdaConfig::default(),
        )
        .unwrap();
        assert_eq!(packaged.size, 9);
        assert_eq!(packaged.sha256, code_sha256(payload));
        assert_eq!(packaged.location.repository_type, "S3");
        assert!(
            packaged
                .location
                .location
                .unwrap()
                .contains("/snapshots/000000000000/f-")
        );
    }

    #[test]
    fn test_should_reject_non_zip_payload() {
        let err = package(
            &zip_code(b"not a zip"),
            PackageType::Zip,
            "f",
            &LambdaConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.code, LambdaErrorCode::InvalidParameterValueException);
        assert!(err.message.starts_with("Could not unzip"));
    }

    #[test]
    fn test_should_require_a_code_source() {
        let err = package(
            &FunctionCode::default(),
            PackageType::Zip,
            "f",
            &LambdaConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.message, "Please provide a source for function code.");
    }

    #[test]
    fn test_should_reference_image_uri() {
        let code = FunctionCode {
            image_uri: Some("000000000000.dkr.ecr.us-east-1.amazonaws.com/app:1".to_owned()),
            ..FunctionCode::default()
        };
        let packaged =
            package(&code, PackageType::Image, "f", &LambdaConfig::default()).unwrap();
        assert_eq!(packaged.location.repository_type, "ECR");
        assert_eq!(packaged.size, 0);
    }

    #[test]
    fn test_should_format_last_modified_with_millis() {
        let ts = last_modified_now();
        assert!(ts.ends_with("+0000"));
        assert_eq!(ts.len(), "2024-01-01T00:00:00.000+0000".len());
    }
}
