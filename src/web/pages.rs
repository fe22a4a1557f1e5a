//! Server-rendered pages: landing, sign-in and the role dashboards

use super::handlers::account::sign_in;
use super::session::{current_user, expired_session_cookie, session_cookie};
use super::state::AppState;
use crate::components::button::{self, Size};
use crate::components::card::{self, Trend, Variant};
use crate::components::form::{self, FieldOptions};
use crate::components::layout::{self, PageOptions};
use crate::components::navigation::{self, NavLink, NavUser};
use crate::components::table::{self, Cell};
use crate::domain::{Appointment, AppointmentStatus, Result, ShasthoError, UserRole};
use crate::services::AuthenticatedUser;
use crate::validation::FormData;
use axum::extract::{ConnectInfo, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{AppendHeaders, Html, IntoResponse, Redirect, Response};
use axum::Form;
use chrono::Utc;
use std::net::SocketAddr;

fn public_nav(app_name: &str) -> String {
    navigation::navbar(
        app_name,
        &[
            NavLink::new("Hospitals", "/api/hospitals"),
            NavLink::new("Doctors", "/api/doctors"),
        ],
        None,
    )
}

fn role_links(role: UserRole) -> Vec<NavLink> {
    let mut links = vec![NavLink::new("Dashboard", "/dashboard")];
    match role {
        UserRole::Admin => {
            links.push(NavLink::new("Pending doctors", "/api/admin/pending/doctors"));
            links.push(NavLink::new(
                "Pending hospital admins",
                "/api/admin/pending/hospital-admins",
            ));
            links.push(NavLink::new("Hospitals", "/api/hospitals"));
        }
        UserRole::Doctor => {
            links.push(NavLink::new("Appointments", "/api/doctor/appointments"));
            links.push(NavLink::new("Availability", "/api/doctor/slots"));
            links.push(NavLink::new("Patients", "/api/doctor/patients"));
        }
        UserRole::Patient => {
            links.push(NavLink::new("My appointments", "/api/patient/appointments"));
            links.push(NavLink::new("My health record", "/api/patient/ehr"));
            links.push(NavLink::new("Doctors", "/api/doctors"));
        }
        UserRole::HospitalAdmin => {
            links.push(NavLink::new(
                "Pending test admins",
                "/api/hospital-admin/pending/test-admins",
            ));
            links.push(NavLink::new("Requests", "/api/hospital-admin/requests"));
        }
        _ => {}
    }
    links.push(NavLink::new("Profile", "/api/auth/profile"));
    links
}

/// `GET /`
pub async fn landing(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if current_user(&state, &headers).await.is_some() {
        return Redirect::to("/dashboard").into_response();
    }

    let hero = format!(
        r#"<section class="text-center py-16"><h1 class="text-4xl font-bold text-gray-900 mb-4">Your health records, in one place</h1><p class="text-lg text-gray-600 mb-8">Book appointments, keep your medical history and share it with the doctors who treat you.</p><div class="space-x-4">{}{}</div></section>"#,
        button::link("Sign in", "/login", Size::Lg, None, ""),
        button::link("Register as a patient", "/api/auth/register/patient", Size::Lg, None, "ml-4"),
    );
    let cards = [
        card::action_card(
            "Find a doctor",
            "Browse doctors by hospital and department.",
            "View doctors",
            "/api/doctors",
            None,
        ),
        card::action_card(
            "Partner hospitals",
            "See every hospital that uses the service.",
            "View hospitals",
            "/api/hospitals",
            None,
        ),
    ];
    let body = format!(
        r#"{hero}<div class="grid grid-cols-1 md:grid-cols-2 gap-6">{}</div>"#,
        cards.concat()
    );
    let options = PageOptions {
        nav: Some(public_nav(state.app_name())),
        ..PageOptions::default()
    };
    Html(layout::page("Welcome", state.app_name(), &body, &options)).into_response()
}

fn login_page_markup(app_name: &str, username: &str, error: Option<&str>) -> String {
    let fields = [
        form::input(
            "email",
            "username",
            &FieldOptions {
                placeholder: "you@example.com".into(),
                error: error.map(str::to_string),
                ..FieldOptions::labelled("Email").required().value(username)
            },
        ),
        form::password("password", &FieldOptions::labelled("Password").required()),
    ];
    let content = form::form("/login", "post", &fields, "Sign in");
    let footer = button::link(
        "Forgot your password?",
        "/api/auth/password-reset",
        Size::Sm,
        None,
        "",
    );
    let body = format!(
        r#"<div class="max-w-md mx-auto mt-12">{}</div>"#,
        card::basic(&content, Some("Sign in"), Some(&footer), Variant::Default)
    );
    let options = PageOptions {
        nav: Some(public_nav(app_name)),
        ..PageOptions::default()
    };
    layout::page("Sign in", app_name, &body, &options)
}

/// `GET /login`
pub async fn login_form(State(state): State<AppState>) -> Html<String> {
    Html(login_page_markup(state.app_name(), "", None))
}

/// `POST /login`: sets the session cookie and redirects to the dashboard
pub async fn login_submit(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Form(form): Form<FormData>,
) -> Response {
    match sign_in(&state, &headers, connect, &form).await {
        Ok(outcome) => {
            let cookie = session_cookie(
                &outcome.token,
                state.session_max_age_secs(),
                state.is_production(),
            );
            (AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to("/dashboard")).into_response()
        }
        Err(err) => {
            let status = err.status();
            let message = match &err {
                super::ApiError::Domain(ShasthoError::Validation(_)) => {
                    "Please enter your email and password".to_string()
                }
                super::ApiError::Domain(
                    ShasthoError::Authentication(m) | ShasthoError::Forbidden(m),
                ) => m.clone(),
                _ => "Sign-in is unavailable right now".to_string(),
            };
            let username = form.get("username").unwrap_or_default();
            (status, Html(login_page_markup(state.app_name(), username, Some(&message)))).into_response()
        }
    }
}

/// `POST /logout`
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(auth) = current_user(&state, &headers).await {
        if let Err(e) = state.services.auth.logout(&auth).await {
            crate::log_error_with_context!(&e, "Failed to end session");
        }
    }
    (
        AppendHeaders([(SET_COOKIE, expired_session_cookie())]),
        Redirect::to("/login"),
    )
        .into_response()
}

fn appointment_rows(appointments: &[Appointment]) -> Vec<Vec<Cell>> {
    appointments
        .iter()
        .map(|a| {
            vec![
                Cell::from(a.date.format("%Y-%m-%d").to_string()),
                Cell::from(a.time_slot.to_string()),
                Cell::from(a.status.to_string()),
            ]
        })
        .collect()
}

fn upcoming(appointments: Vec<Appointment>) -> Vec<Appointment> {
    let today = Utc::now().date_naive();
    appointments
        .into_iter()
        .filter(|a| a.status == AppointmentStatus::Scheduled && a.date >= today)
        .collect()
}

async fn dashboard_body(state: &AppState, auth: &AuthenticatedUser) -> Result<String> {
    let services = &state.services;
    let greeting = format!(
        r#"<h1 class="text-2xl font-bold text-gray-900 mb-6">Welcome, {}</h1>"#,
        crate::components::escape(&auth.user.full_name)
    );

    let content = match auth.role() {
        UserRole::Patient => {
            let patient = services.directory.patient_for_user(auth.id()).await?;
            let appointments = upcoming(services.booking.patient_appointments(patient.id).await?);
            let book = card::action_card(
                "Book an appointment",
                "Pick a doctor and a free time slot.",
                "Book now",
                "/api/doctors",
                None,
            );
            format!(
                r#"<div class="grid grid-cols-1 md:grid-cols-2 gap-6 mb-8">{}{book}</div>{}"#,
                card::stat_card(&appointments.len().to_string(), "Upcoming appointments", None),
                table::table(
                    &["Date", "Time", "Status"],
                    &appointment_rows(&appointments),
                    "No upcoming appointments"
                )
            )
        }
        UserRole::Doctor => {
            let doctor = services.directory.doctor_for_user(auth.id()).await?;
            let today = Utc::now().date_naive();
            let todays = services
                .booking
                .doctor_appointments(doctor.id, Some(today))
                .await?;
            let completed = todays
                .iter()
                .filter(|a| a.status == AppointmentStatus::Completed)
                .count();
            let ratio = format!("{completed}/{}", todays.len());
            format!(
                r#"<div class="grid grid-cols-1 md:grid-cols-2 gap-6 mb-8">{}{}</div>{}"#,
                card::stat_card(&todays.len().to_string(), "Appointments today", None),
                card::stat_card(
                    &completed.to_string(),
                    "Completed today",
                    Some((ratio.as_str(), Trend::Flat))
                ),
                table::table(
                    &["Date", "Time", "Status"],
                    &appointment_rows(&todays),
                    "No appointments today"
                )
            )
        }
        UserRole::Admin => {
            let doctors = services.approvals.pending_doctors().await?;
            let admins = services.approvals.pending_hospital_admins().await?;
            let hospitals = services.directory.list_hospitals().await?;
            let rows: Vec<Vec<Cell>> = doctors
                .iter()
                .map(|p| {
                    vec![
                        Cell::from(p.user.full_name.as_str()),
                        Cell::from(p.user.username.as_str()),
                        Cell::from(
                            p.profile
                                .as_ref()
                                .map(|d| d.hospital_name.clone())
                                .unwrap_or_default(),
                        ),
                    ]
                })
                .collect();
            format!(
                r#"<div class="grid grid-cols-1 md:grid-cols-3 gap-6 mb-8">{}{}{}</div>{}"#,
                card::stat_card(&doctors.len().to_string(), "Doctors awaiting approval", None),
                card::stat_card(&admins.len().to_string(), "Hospital admins awaiting approval", None),
                card::stat_card(&hospitals.len().to_string(), "Hospitals", None),
                table::table(&["Name", "Email", "Hospital"], &rows, "No pending doctors")
            )
        }
        UserRole::HospitalAdmin => {
            let pending = services.approvals.pending_test_admins(auth.id()).await?;
            let hospital_id = services.approvals.hospital_of(auth.id()).await?;
            let requests = services
                .approvals
                .list_admin_requests(Some(hospital_id), None)
                .await?;
            let rows: Vec<Vec<Cell>> = requests
                .iter()
                .map(|r| {
                    vec![
                        Cell::from(r.full_name.as_str()),
                        Cell::from(r.department.as_str()),
                        Cell::from(r.status.to_string()),
                    ]
                })
                .collect();
            format!(
                r#"<div class="grid grid-cols-1 md:grid-cols-2 gap-6 mb-8">{}{}</div>{}"#,
                card::stat_card(&pending.len().to_string(), "Test admins awaiting approval", None),
                card::stat_card(&requests.len().to_string(), "Admin requests", None),
                table::table(&["Name", "Department", "Status"], &rows, "No requests yet")
            )
        }
        _ => card::basic(
            r#"<p class="text-gray-600">Your account is active. Use the API to manage your records.</p>"#,
            Some("Account"),
            None,
            Variant::Default,
        ),
    };
    Ok(format!("{greeting}{content}"))
}

/// `GET /dashboard`; anonymous visitors are sent to `/login`
pub async fn dashboard(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(auth) = current_user(&state, &headers).await else {
        return Redirect::to("/login").into_response();
    };

    let body = match dashboard_body(&state, &auth).await {
        Ok(body) => body,
        Err(e) => {
            crate::log_error_with_context!(&e, "Failed to build dashboard");
            card::basic(
                r#"<p class="text-error">Some of your dashboard could not be loaded. Please try again later.</p>"#,
                None,
                None,
                Variant::Default,
            )
        }
    };

    let links = role_links(auth.role());
    let nav_user = NavUser {
        name: auth.user.full_name.clone(),
        role: auth.role().to_string(),
    };
    let options = PageOptions {
        nav: Some(navigation::navbar(state.app_name(), &[], Some(&nav_user))),
        sidebar: Some(navigation::sidebar(&links, "/dashboard")),
        notice: None,
    };
    let html = layout::page("Dashboard", state.app_name(), &body, &options);
    (StatusCode::OK, Html(html)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_role_gets_dashboard_and_profile_links() {
        for role in UserRole::ALL {
            let links = role_links(*role);
            assert_eq!(links.first().map(|l| l.href.as_str()), Some("/dashboard"));
            assert_eq!(
                links.last().map(|l| l.href.as_str()),
                Some("/api/auth/profile")
            );
        }
    }

    #[test]
    fn test_login_page_keeps_username_and_error() {
        let html = login_page_markup("Shastho", "nadia@example.com", Some("Invalid username or password"));
        assert!(html.contains(r#"value="nadia@example.com""#));
        assert!(html.contains("Invalid username or password"));
        assert!(html.contains(r#"<form action="/login" method="post""#));
    }
}
