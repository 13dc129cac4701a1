use anyhow::{format_err, Error};
use async_google_apis_common as common;
use async_trait::async_trait;
use common::{
    yup_oauth2::{self, authenticator::Authenticator, InstalledFlowAuthenticator},
    TlsClient,
};
use hyper::{
    body::HttpBody,
    client::HttpConnector,
    header::{AUTHORIZATION, CONTENT_TYPE},
    Body, Method, Request, Response,
};
use hyper_rustls::HttpsConnector;
use log::debug;
use serde::de::DeserializeOwned;
use stack_string::{format_sstr, StackString};
use std::{
    fmt::{self, Debug, Formatter},
    path::Path,
    sync::Arc,
};
use tokio::{
    fs::{self, create_dir_all},
    io::AsyncWriteExt,
};
use url::Url;

use crate::{
    drive_api::DriveApi,
    drive_v3_types::{File, FileList, Revision, RevisionList, DRIVE_API_BASE, DRIVE_SCOPE},
    errors::DriveError,
    exponential_retry,
    rate_limiter::RateLimiter,
};

type DriveAuthenticator = Authenticator<HttpsConnector<HttpConnector>>;

fn https_client() -> TlsClient {
    let conn = hyper_rustls::HttpsConnector::with_native_roots();
    hyper::Client::builder().build(conn)
}

fn api_url(path: &str) -> Result<Url, Error> {
    Url::parse(DRIVE_API_BASE)?.join(path).map_err(Into::into)
}

#[derive(Clone)]
pub struct GDriveInstance {
    client: TlsClient,
    auth: Arc<DriveAuthenticator>,
    page_size: i32,
    session_name: StackString,
    rate_limit: RateLimiter,
}

impl Debug for GDriveInstance {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "GDriveInstance({})", self.session_name)
    }
}

impl GDriveInstance {
    pub async fn new(
        gdrive_token_path: &Path,
        gdrive_secret_file: &Path,
        session_name: &str,
    ) -> Result<Self, Error> {
        debug!("{:?}", gdrive_secret_file);
        let https = https_client();
        let sec = yup_oauth2::read_application_secret(gdrive_secret_file).await?;

        let token_file = gdrive_token_path.join(format!("{}.json", session_name));

        let parent = gdrive_token_path;

        if !parent.exists() {
            create_dir_all(parent).await?;
        }

        debug!("{:?}", token_file);
        let auth = InstalledFlowAuthenticator::builder(
            sec,
            yup_oauth2::InstalledFlowReturnMethod::HTTPRedirect,
        )
        .persist_tokens_to_disk(token_file)
        .hyper_client(https.clone())
        .build()
        .await?;

        Ok(Self {
            client: https,
            auth: Arc::new(auth),
            page_size: 1000,
            session_name: session_name.into(),
            rate_limit: RateLimiter::new(1000, 60000),
        })
    }

    pub fn with_page_size(mut self, page_size: i32) -> Self {
        self.page_size = page_size;
        self
    }

    async fn request(
        &self,
        method: Method,
        url: &Url,
        body: Option<StackString>,
    ) -> Result<Response<Body>, Error> {
        let token = self.auth.token(&[DRIVE_SCOPE]).await?;
        let builder = Request::builder()
            .method(method.clone())
            .uri(url.as_str())
            .header(AUTHORIZATION, format_sstr!("Bearer {}", token.as_str()).as_str());
        let req = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };
        debug!("{} {}", method, url);
        self.rate_limit.acquire().await;
        let resp = self.client.request(req).await?;
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            let body = hyper::body::to_bytes(resp.into_body()).await?;
            Err(DriveError::Api {
                method,
                path: url.path().into(),
                status,
                body: String::from_utf8_lossy(&body).as_ref().into(),
            }
            .into())
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, Error> {
        exponential_retry(|| async {
            let resp = self.request(Method::GET, url, None).await?;
            let body = hyper::body::to_bytes(resp.into_body()).await?;
            serde_json::from_slice(&body).map_err(Into::into)
        })
        .await
    }

    async fn get_filelist(
        &self,
        page_token: &Option<StackString>,
        query: &str,
        fields: &str,
    ) -> Result<FileList, Error> {
        let mut url = api_url("files")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", query)
                .append_pair("spaces", "drive")
                .append_pair("fields", &format_sstr!("nextPageToken, {fields}"))
                .append_pair("pageSize", &format_sstr!("{}", self.page_size));
            if let Some(token) = page_token {
                pairs.append_pair("pageToken", token);
            }
        }
        self.get_json(&url).await
    }

    pub async fn get_file_metadata(&self, id: &str) -> Result<File, Error> {
        let mut url = api_url(&format_sstr!("files/{id}"))?;
        url.query_pairs_mut()
            .append_pair("fields", "id,name,parents,mimeType");
        self.get_json(&url).await
    }

    async fn get_revision_list(
        &self,
        fileid: &str,
        page_token: &Option<StackString>,
    ) -> Result<RevisionList, Error> {
        let mut url = api_url(&format_sstr!("files/{fileid}/revisions"))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair(
                    "fields",
                    "nextPageToken, revisions(id, modifiedTime, originalFilename, mimeType)",
                )
                .append_pair("pageSize", "1000");
            if let Some(token) = page_token {
                pairs.append_pair("pageToken", token);
            }
        }
        self.get_json(&url).await
    }
}

#[async_trait]
impl DriveApi for GDriveInstance {
    async fn get_all_files(&self, query: &str, fields: &str) -> Result<Vec<File>, Error> {
        let mut all_files = Vec::new();
        let mut page_token: Option<StackString> = None;
        loop {
            let filelist = self.get_filelist(&page_token, query, fields).await?;

            if let Some(files) = filelist.files {
                all_files.extend(files);
            }

            page_token = filelist.next_page_token.map(Into::into);
            if page_token.is_none() {
                break;
            }
        }
        debug!("{} files for {}", all_files.len(), query);
        Ok(all_files)
    }

    async fn get_root_id(&self) -> Result<StackString, Error> {
        self.get_file_metadata("root")
            .await?
            .id
            .map(Into::into)
            .ok_or_else(|| format_err!("Drive returned no id for root"))
    }

    async fn get_revisions(&self, fileid: &str) -> Result<Vec<Revision>, Error> {
        let mut revisions = Vec::new();
        let mut page_token: Option<StackString> = None;
        loop {
            let revlist = self.get_revision_list(fileid, &page_token).await?;
            if let Some(revs) = revlist.revisions {
                revisions.extend(revs);
            }
            page_token = revlist.next_page_token.map(Into::into);
            if page_token.is_none() {
                break;
            }
        }
        Ok(revisions)
    }

    async fn download_revision(
        &self,
        fileid: &str,
        revisionid: &str,
        local: &Path,
    ) -> Result<(), Error> {
        let mut url = api_url(&format_sstr!("files/{fileid}/revisions/{revisionid}"))?;
        url.query_pairs_mut().append_pair("alt", "media");
        let resp = self.request(Method::GET, &url, None).await?;
        let mut body = resp.into_body();
        let mut outfile = fs::File::create(local).await?;
        let result = async {
            while let Some(chunk) = body.data().await {
                outfile.write_all(&chunk?).await?;
            }
            outfile.flush().await?;
            Ok::<(), Error>(())
        }
        .await;
        if result.is_err() {
            drop(outfile);
            fs::remove_file(local).await.ok();
        }
        result
    }

    async fn delete_revision(&self, fileid: &str, revisionid: &str) -> Result<(), Error> {
        let url = api_url(&format_sstr!("files/{fileid}/revisions/{revisionid}"))?;
        self.request(Method::DELETE, &url, None).await?;
        Ok(())
    }

    async fn rename(&self, fileid: &str, new_name: &str) -> Result<(), Error> {
        let url = api_url(&format_sstr!("files/{fileid}"))?;
        let f = File {
            name: Some(new_name.to_string()),
            ..File::default()
        };
        let body = serde_json::to_string(&f)?;
        self.request(Method::PATCH, &url, Some(body.into())).await?;
        Ok(())
    }

    async fn delete_permanently(&self, fileid: &str) -> Result<(), Error> {
        let url = api_url(&format_sstr!("files/{fileid}"))?;
        self.request(Method::DELETE, &url, None).await?;
        Ok(())
    }
}
