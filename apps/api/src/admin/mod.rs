//! Staff dashboard.
//!
//! The set of managed models is an explicit [`AdminSite`] value built at
//! startup; only registered models get routes.

pub mod handlers;
pub mod queries;
pub mod stats;

use axum::{
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::auth::StaffUser;
use crate::state::AppState;

pub const SITE_HEADER: &str = "Job Board Administration";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminModel {
    Category,
    Company,
    WorkType,
}

impl AdminModel {
    /// URL segment under `/admin`.
    pub fn path(self) -> &'static str {
        match self {
            AdminModel::Category => "categories",
            AdminModel::Company => "companies",
            AdminModel::WorkType => "work-types",
        }
    }

    /// Columns shown in the list view.
    pub fn list_display(self) -> &'static [&'static str] {
        match self {
            AdminModel::Category => &["name", "description", "active"],
            AdminModel::Company => &["name", "verified", "owner_username"],
            AdminModel::WorkType => &["name", "active"],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminModelEntry {
    pub model: AdminModel,
    pub path: String,
    pub list_display: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminIndex {
    pub header: String,
    pub models: Vec<AdminModelEntry>,
    pub reports: Vec<&'static str>,
}

#[derive(Debug, Clone)]
pub struct AdminSite {
    header: String,
    models: Vec<AdminModel>,
}

impl AdminSite {
    pub fn new(header: impl Into<String>) -> Self {
        AdminSite {
            header: header.into(),
            models: Vec::new(),
        }
    }

    /// Registers a model once; repeated registration is a no-op.
    pub fn register(mut self, model: AdminModel) -> Self {
        if !self.is_registered(model) {
            self.models.push(model);
        }
        self
    }

    pub fn is_registered(&self, model: AdminModel) -> bool {
        self.models.contains(&model)
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn index(&self) -> AdminIndex {
        AdminIndex {
            header: self.header.clone(),
            models: self
                .models
                .iter()
                .map(|&model| AdminModelEntry {
                    model,
                    path: format!("/admin/{}", model.path()),
                    list_display: model.list_display(),
                })
                .collect(),
            reports: vec!["/admin/recruitment-stats"],
        }
    }

    /// Routes for the index, the statistics report and each registered model.
    pub fn router(&self) -> Router<AppState> {
        let index = self.index();
        let mut router = Router::new()
            .route(
                "/admin",
                get(move |StaffUser(_staff): StaffUser| async move { Json(index) }),
            )
            .route(
                "/admin/recruitment-stats",
                get(handlers::handle_recruitment_stats),
            );

        for &model in &self.models {
            router = match model {
                AdminModel::Category => router
                    .route(
                        "/admin/categories",
                        get(handlers::handle_list_categories).post(handlers::handle_create_category),
                    )
                    .route(
                        "/admin/categories/:id",
                        get(handlers::handle_get_category)
                            .patch(handlers::handle_update_category)
                            .delete(handlers::handle_delete_category),
                    ),
                AdminModel::WorkType => router
                    .route(
                        "/admin/work-types",
                        get(handlers::handle_list_work_types).post(handlers::handle_create_work_type),
                    )
                    .route(
                        "/admin/work-types/:id",
                        get(handlers::handle_get_work_type)
                            .patch(handlers::handle_update_work_type)
                            .delete(handlers::handle_delete_work_type),
                    ),
                AdminModel::Company => router
                    .route(
                        "/admin/companies",
                        get(handlers::handle_list_companies).post(handlers::handle_create_company),
                    )
                    .route(
                        "/admin/companies/:id",
                        get(handlers::handle_get_company)
                            .patch(handlers::handle_update_company)
                            .delete(handlers::handle_delete_company),
                    )
                    .route(
                        "/admin/companies/:id/verify",
                        get(handlers::handle_verify_company),
                    ),
            };
        }
        router
    }
}

impl Default for AdminSite {
    fn default() -> Self {
        AdminSite::new(SITE_HEADER)
            .register(AdminModel::Category)
            .register(AdminModel::Company)
            .register(AdminModel::WorkType)
    }
}
