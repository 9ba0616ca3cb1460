use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::AppError;
use crate::models::{
    CreateResourceRequest, CreateSubjectRequest, Resource, Subject, UpdateResourceRequest,
    UpdateSubjectRequest, UpdateWeekRequest, Week,
};

#[async_trait]
pub trait PlanningApi: Send + Sync {
    async fn list_subjects(&self) -> Result<Vec<Subject>, AppError>;
    async fn get_subject(&self, id: i64) -> Result<Subject, AppError>;
    async fn create_subject(&self, req: &CreateSubjectRequest) -> Result<Subject, AppError>;
    async fn update_subject(&self, id: i64, req: &UpdateSubjectRequest) -> Result<Subject, AppError>;
    async fn delete_subject(&self, id: i64) -> Result<(), AppError>;

    async fn get_week(&self, id: i64) -> Result<Week, AppError>;
    async fn update_week(&self, id: i64, req: &UpdateWeekRequest) -> Result<Week, AppError>;

    async fn create_resource(
        &self,
        week_id: i64,
        req: &CreateResourceRequest,
    ) -> Result<Resource, AppError>;
    async fn update_resource(
        &self,
        id: i64,
        req: &UpdateResourceRequest,
    ) -> Result<Resource, AppError>;
    async fn delete_resource(&self, id: i64) -> Result<(), AppError>;

    async fn export_subject(&self, id: i64) -> Result<Vec<u8>, AppError>;
}

pub struct HttpPlanningClient {
    client: Client,
    config: ApiConfig,
}

impl HttpPlanningClient {
    pub fn new(config: ApiConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.config.url(path);
        debug!("{} {}", method, url);
        self.client.request(method, url)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, AppError> {
        let response = builder.send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Api { status, body });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        decode(response).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self.send(self.request(method, path).json(body)).await?;
        decode(response).await
    }

    async fn delete(&self, path: &str) -> Result<(), AppError> {
        self.send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let body_text = response.text().await?;
    serde_json::from_str::<T>(&body_text).map_err(|e| {
        tracing::error!("Failed to parse: {}", e);
        AppError::Decode(e.to_string())
    })
}

#[async_trait]
impl PlanningApi for HttpPlanningClient {
    async fn list_subjects(&self) -> Result<Vec<Subject>, AppError> {
        self.get_json("/subjects").await
    }

    async fn get_subject(&self, id: i64) -> Result<Subject, AppError> {
        self.get_json(&format!("/subjects/{}", id)).await
    }

    async fn create_subject(&self, req: &CreateSubjectRequest) -> Result<Subject, AppError> {
        self.send_json(Method::POST, "/subjects", req).await
    }

    async fn update_subject(&self, id: i64, req: &UpdateSubjectRequest) -> Result<Subject, AppError> {
        self.send_json(Method::PUT, &format!("/subjects/{}", id), req)
            .await
    }

    async fn delete_subject(&self, id: i64) -> Result<(), AppError> {
        self.delete(&format!("/subjects/{}", id)).await
    }

    async fn get_week(&self, id: i64) -> Result<Week, AppError> {
        self.get_json(&format!("/weeks/{}", id)).await
    }

    async fn update_week(&self, id: i64, req: &UpdateWeekRequest) -> Result<Week, AppError> {
        self.send_json(Method::PUT, &format!("/weeks/{}", id), req).await
    }

    async fn create_resource(
        &self,
        week_id: i64,
        req: &CreateResourceRequest,
    ) -> Result<Resource, AppError> {
        self.send_json(Method::POST, &format!("/weeks/{}/resources", week_id), req)
            .await
    }

    async fn update_resource(
        &self,
        id: i64,
        req: &UpdateResourceRequest,
    ) -> Result<Resource, AppError> {
        self.send_json(Method::PUT, &format!("/weeks/resources/{}", id), req)
            .await
    }

    async fn delete_resource(&self, id: i64) -> Result<(), AppError> {
        self.delete(&format!("/weeks/resources/{}", id)).await
    }

    async fn export_subject(&self, id: i64) -> Result<Vec<u8>, AppError> {
        let response = self
            .send(self.request(Method::GET, &format!("/export/subjects/{}", id)))
            .await?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}
