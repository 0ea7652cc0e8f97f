//! Organization and membership CRUD.
//!
//! Remote only: there is no offline stand-in, an unreachable backend is a
//! network-class failure like any other call. Payloads are returned bare
//! (no envelope) by the backend.

#[cfg(test)]
#[path = "organization_test.rs"]
mod organization_test;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::net::endpoints;
use crate::net::gateway::{ApiService, RequestOptions};
use crate::net::response::ApiResponse;
use crate::net::types::{
    AddMemberData, CreateOrganizationData, Organization, OrganizationMember, UpdateOrganizationData,
};

pub const CREATE_FAILED: &str = "Failed to create organization";
pub const LIST_FAILED: &str = "Failed to fetch organizations";
pub const DETAILS_FAILED: &str = "Failed to fetch organization details";
pub const UPDATE_FAILED: &str = "Failed to update organization";
pub const DELETE_FAILED: &str = "Failed to delete organization";
pub const ADD_MEMBER_FAILED: &str = "Failed to add member";
pub const REMOVE_MEMBER_FAILED: &str = "Failed to remove member";

#[derive(Clone, Debug)]
pub struct OrganizationClient {
    api: ApiService,
}

impl OrganizationClient {
    #[must_use]
    pub fn new(api: ApiService) -> Self {
        Self { api }
    }

    async fn fetch<T: DeserializeOwned>(&self, endpoint: &str, failure_message: &'static str) -> ApiResponse<T> {
        self.api.request(endpoint, RequestOptions::get().failure_message(failure_message)).await.decode()
    }

    async fn submit<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
        body: &B,
        failure_message: &'static str,
    ) -> ApiResponse<T> {
        self.api.request_with(endpoint, options.failure_message(failure_message), body).await.decode()
    }

    /// `POST /api/v1/organizations`.
    pub async fn create(&self, data: &CreateOrganizationData) -> ApiResponse<Organization> {
        self.submit(endpoints::ORGANIZATIONS, RequestOptions::post(), data, CREATE_FAILED).await
    }

    /// Organizations the signed-in user belongs to.
    pub async fn list(&self) -> ApiResponse<Vec<Organization>> {
        self.fetch(endpoints::ORGANIZATIONS, LIST_FAILED).await
    }

    pub async fn get(&self, org_id: &str) -> ApiResponse<Organization> {
        self.fetch(&endpoints::organization(org_id), DETAILS_FAILED).await
    }

    pub async fn update(&self, org_id: &str, data: &UpdateOrganizationData) -> ApiResponse<Organization> {
        self.submit(&endpoints::organization(org_id), RequestOptions::put(), data, UPDATE_FAILED).await
    }

    /// Success carries no payload.
    pub async fn delete(&self, org_id: &str) -> ApiResponse<()> {
        let options = RequestOptions::delete().failure_message(DELETE_FAILED);
        self.api.request(&endpoints::organization(org_id), options).await.map(|_| ())
    }

    pub async fn add_member(&self, org_id: &str, data: &AddMemberData) -> ApiResponse<OrganizationMember> {
        self.submit(&endpoints::organization_members(org_id), RequestOptions::post(), data, ADD_MEMBER_FAILED)
            .await
    }

    /// `DELETE /api/v1/organizations/:id/members` with `{ memberId }`.
    pub async fn remove_member(&self, org_id: &str, member_id: &str) -> ApiResponse<()> {
        let options = RequestOptions::delete()
            .body(json!({ "memberId": member_id }))
            .failure_message(REMOVE_MEMBER_FAILED);
        self.api.request(&endpoints::organization_members(org_id), options).await.map(|_| ())
    }
}
