use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;

use crate::config::StorageConfig;

/// Uploads rendered portfolio sites to S3-compatible storage.
#[derive(Clone)]
pub struct SitePublisher {
    s3: aws_sdk_s3::Client,
    bucket: String,
    public_url: String,
}

pub fn site_key(portfolio_id: &str) -> String {
    format!("portfolios/{portfolio_id}/index.html")
}

impl SitePublisher {
    /// Builds an S3 client for MinIO (local) or AWS (production).
    pub async fn connect(storage: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            &storage.access_key_id,
            &storage.secret_access_key,
            None,
            None,
            "placify-static",
        );

        let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(credentials)
            .endpoint_url(&storage.endpoint)
            .load()
            .await;

        Self {
            s3: aws_sdk_s3::Client::new(&s3_config),
            bucket: storage.bucket.clone(),
            public_url: storage.public_url.clone(),
        }
    }

    /// Uploads the page and returns its public URL.
    pub async fn publish(&self, portfolio_id: &str, html: String) -> Result<String> {
        let key = site_key(portfolio_id);
        self.s3
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(html.into_bytes()))
            .content_type("text/html; charset=utf-8")
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("S3 upload failed: {e}"))?;

        info!("Published portfolio site to s3://{}/{}", self.bucket, key);
        Ok(format!("{}/{}", self.public_url, key))
    }

    /// Removes a published page; missing objects are not an error.
    pub async fn unpublish(&self, portfolio_id: &str) -> Result<()> {
        self.s3
            .delete_object()
            .bucket(&self.bucket)
            .key(site_key(portfolio_id))
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("S3 delete failed: {e}"))?;
        Ok(())
    }
}
