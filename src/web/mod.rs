//! HTTP surface
//!
//! Returns a composable `Router`: the HTML pages at the root and the JSON API
//! under `/api/`.
//!
//! Layers on the API (outermost first):
//! 1. Trace → 2. `Cache-Control: no-store` → 3. Session → 4. Role guard → handler
//!
//! Public routes skip 3 and 4. Signed-in routes that any role may use skip 4.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod pages;
pub mod session;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::http::header::CACHE_CONTROL;
use axum::http::HeaderValue;
use axum::middleware::{from_fn_with_state, map_response};
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::Router;
use handlers::{account, approvals, clinical, directory, scheduling};
use session::{require_roles, require_session};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

/// Build the application router
pub fn router(state: AppState) -> Router {
    let public_api = Router::new()
        .route("/status", get(account::status))
        .route("/auth/register/:kind", post(account::register))
        .route("/auth/login", post(account::login))
        .route(
            "/auth/password-reset",
            post(account::request_password_reset),
        )
        .route(
            "/auth/password-reset/:token",
            get(account::verify_password_reset).post(account::reset_password),
        )
        .route("/hospitals", get(directory::list_hospitals))
        .route(
            "/hospitals/:id/departments",
            get(directory::hospital_departments),
        )
        .route("/departments", get(directory::list_departments))
        .route("/doctors", get(directory::list_doctors))
        .route("/doctors/:id", get(directory::doctor_profile));

    let account_api = Router::new()
        .route("/auth/logout", post(account::logout))
        .route("/auth/profile", get(account::profile))
        .route("/auth/change-password", post(account::change_password))
        .route("/auth/language", post(account::change_language))
        .route("/auth/sessions", get(account::sessions))
        .route(
            "/auth/sessions/:id",
            axum::routing::delete(account::terminate_session),
        );

    let admin_api = Router::new()
        .route("/admin/hospitals", post(directory::create_hospital))
        .route(
            "/admin/hospitals/:id",
            put(directory::update_hospital).delete(directory::delete_hospital),
        )
        .route(
            "/admin/hospitals/:id/departments/:department_id",
            post(directory::link_department),
        )
        .route("/admin/departments", post(directory::create_department))
        .route(
            "/admin/departments/:id",
            put(directory::update_department).delete(directory::delete_department),
        )
        .route("/admin/doctors", post(directory::create_doctor))
        .route(
            "/admin/doctors/:id",
            put(directory::update_doctor).delete(directory::delete_doctor),
        )
        .route(
            "/admin/patients",
            get(directory::list_patients).post(directory::create_patient),
        )
        .route(
            "/admin/patients/:id",
            put(directory::update_patient).delete(directory::delete_patient),
        )
        .route("/admin/pending/doctors", get(approvals::pending_doctors))
        .route(
            "/admin/pending/doctors/:user_id/approve",
            post(approvals::approve_doctor),
        )
        .route(
            "/admin/pending/doctors/:user_id/reject",
            post(approvals::reject_doctor),
        )
        .route(
            "/admin/pending/hospital-admins",
            get(approvals::pending_hospital_admins),
        )
        .route(
            "/admin/pending/hospital-admins/:user_id/approve",
            post(approvals::approve_hospital_admin),
        )
        .route(
            "/admin/pending/hospital-admins/:user_id/reject",
            post(approvals::reject_hospital_admin),
        )
        .route("/admin/requests", get(approvals::all_admin_requests))
        .route(
            "/admin/requests/:id/approve",
            post(approvals::admin_approve_request),
        )
        .route(
            "/admin/requests/:id/reject",
            post(approvals::admin_reject_request),
        )
        .route_layer(from_fn_with_state(session::ADMIN, require_roles));

    let doctor_api = Router::new()
        .route("/doctor/profile", get(clinical::profile))
        .route("/doctor/patients", get(directory::search_patients))
        .route(
            "/doctor/patients/:id/ehr",
            get(clinical::patient_ehr).post(clinical::create_patient_ehr),
        )
        .route(
            "/doctor/patients/:id/summary",
            get(clinical::medical_summary),
        )
        .route(
            "/doctor/ehr/:ehr_id/visits",
            get(clinical::list_visits).post(clinical::add_visit),
        )
        .route(
            "/doctor/ehr/:ehr_id/records/:kind",
            get(clinical::list_ehr_records).post(clinical::add_ehr_record),
        )
        .route(
            "/doctor/visits/:visit_id",
            get(clinical::visit_details).delete(clinical::delete_visit),
        )
        .route(
            "/doctor/visits/:visit_id/records/:kind",
            get(clinical::list_visit_records).post(clinical::add_visit_record),
        )
        .route(
            "/doctor/records/:kind/:id",
            get(clinical::get_record)
                .put(clinical::update_record)
                .delete(clinical::delete_record),
        )
        .route(
            "/doctor/slots",
            get(scheduling::list_slots).post(scheduling::add_slot),
        )
        .route(
            "/doctor/slots/:id",
            axum::routing::delete(scheduling::delete_slot),
        )
        .route(
            "/doctor/appointments",
            get(scheduling::doctor_appointments),
        )
        .route(
            "/doctor/appointments/:id/status",
            post(scheduling::set_appointment_status),
        )
        .route_layer(from_fn_with_state(session::DOCTOR, require_roles));

    let patient_api = Router::new()
        .route(
            "/patient/profile",
            get(scheduling::patient_profile).put(scheduling::update_patient_profile),
        )
        .route("/patient/ehr", get(scheduling::my_ehr))
        .route(
            "/patient/doctors/:id/slots",
            get(scheduling::available_slots),
        )
        .route(
            "/patient/appointments",
            get(scheduling::my_appointments).post(scheduling::book),
        )
        .route(
            "/patient/appointments/:id/cancel",
            post(scheduling::cancel),
        )
        .route_layer(from_fn_with_state(session::PATIENT, require_roles));

    let hospital_admin_api = Router::new()
        .route(
            "/hospital-admin/pending/test-admins",
            get(approvals::pending_test_admins),
        )
        .route(
            "/hospital-admin/pending/test-admins/:user_id/approve",
            post(approvals::approve_test_admin),
        )
        .route(
            "/hospital-admin/pending/test-admins/:user_id/reject",
            post(approvals::reject_test_admin),
        )
        .route(
            "/hospital-admin/requests",
            get(approvals::hospital_admin_requests).post(approvals::submit_hospital_request),
        )
        .route(
            "/hospital-admin/requests/:id/approve",
            post(approvals::approve_request),
        )
        .route(
            "/hospital-admin/requests/:id/reject",
            post(approvals::reject_request),
        )
        .route_layer(from_fn_with_state(session::HOSPITAL_ADMIN, require_roles));

    let test_admin_api = Router::new()
        .route(
            "/test-admin/requests",
            post(approvals::submit_test_admin_request),
        )
        .route(
            "/test-admin/ehr/:ehr_id/test-results",
            post(clinical::upload_test_result),
        )
        .route_layer(from_fn_with_state(session::TEST_ADMIN, require_roles));

    let protected_api = Router::new()
        .merge(account_api)
        .merge(admin_api)
        .merge(doctor_api)
        .merge(patient_api)
        .merge(hospital_admin_api)
        .merge(test_admin_api)
        .route_layer(from_fn_with_state(state.clone(), require_session));

    let api = public_api
        .merge(protected_api)
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    let html = Router::new()
        .route("/", get(pages::landing))
        .route("/login", get(pages::login_form).post(pages::login_submit))
        .route("/logout", post(pages::logout))
        .route("/dashboard", get(pages::dashboard))
        .layer(map_response(html_security_headers));

    Router::new()
        .merge(html)
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn html_security_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    response
}
