//! `/admin/login` action dispatch: render, do_login, logout, auto-login.

use std::net::IpAddr;

use axum::Json;
use axum::extract::{Form, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::error;

use helpdesk_auth::challenge::ChallengeGate;
use helpdesk_auth::login::{FieldError, LoginForm, LoginOutcome};
use helpdesk_auth::remember::RememberAction;
use helpdesk_core::error::AppError;
use helpdesk_core::messages::MessageKey;
use helpdesk_entity::session::Session;

use crate::cookies::{self, REMEMBER_COOKIE, USERNAME_COOKIE};
use crate::dto::request::LoginQuery;
use crate::dto::response::{ApiResponse, FieldErrorBody, LoginPageState, LoginSuccessBody};
use crate::error::ApiErrorResponse;
use crate::extractors::ClientIp;
use crate::state::AppState;

/// Language used for messages before anyone is logged in.
const DEFAULT_LANGUAGE: &str = "en";

/// GET /admin/login — dispatches on the `a` query parameter.
pub async fn login_get(
    State(state): State<AppState>,
    ip: ClientIp,
    Query(query): Query<LoginQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    match query.a.as_deref() {
        Some("logout") => logout(&state, &headers, query.token.as_deref()).await,
        Some("login") => render(&state, &headers, notice_from_query(&query)).await,
        _ => default_entry(&state, &headers, ip.0, notice_from_query(&query)).await,
    }
}

/// POST /admin/login — the do_login action.
pub async fn login_post(
    State(state): State<AppState>,
    ip: ClientIp,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let (mut session, new_raw) = start_session(&state, &headers).await?;

    // Anti-CSRF check first; the submission is not processed without it.
    let presented = form.token.as_deref().unwrap_or_default();
    if !state.session_manager.verify_csrf(&session, presented) {
        return respond_with_page(
            &state,
            &headers,
            &mut session,
            new_raw,
            Vec::new(),
            Some(MessageKey::InvalidToken),
        )
        .await;
    }

    let outcome = state.login_flow.submit(&form, ip.0, &mut session).await?;

    match outcome {
        LoginOutcome::Success {
            redirect,
            user,
            session_token,
            remember,
            notice,
        } => {
            let mut out = HeaderMap::new();
            if let Some(raw) = session_token {
                apply_session_cookie(&state, &mut out, &raw);
            }
            apply_remember_cookies(&state, &mut out, &remember);

            // Opportunistic housekeeping; a failure never blocks the login.
            if let Err(e) = state.autoclose_service.run().await {
                error!(error = %e, "Stale-ticket auto-closure failed");
            }

            apply_redirect(&mut out, &redirect);

            let notice = notice.map(|key| state.messages.get(&user.language, key).to_string());
            let body = ApiResponse::ok(LoginSuccessBody {
                redirect,
                user: (&user).into(),
                notice,
            });
            Ok((StatusCode::SEE_OTHER, out, Json(body)).into_response())
        }
        LoginOutcome::Rejected { errors, notice } => {
            // Credential and inactive-account rejections destroyed the
            // session; give the re-rendered form a fresh one.
            let destroyed = errors.iter().any(|e| {
                matches!(
                    e.message,
                    MessageKey::WrongCredentials | MessageKey::InactiveAccount
                )
            });
            let (mut session, new_raw) = if destroyed {
                state.session_manager.start(None).await?
            } else {
                (session, new_raw)
            };
            respond_with_page(&state, &headers, &mut session, new_raw, errors, notice).await
        }
        LoginOutcome::Banned {
            retry_after_minutes,
        } => {
            let mut out = HeaderMap::new();
            clear_session_cookie(&state, &mut out);
            let body = ApiErrorResponse {
                error: "RATE_LIMITED".to_string(),
                message: state
                    .messages
                    .get(DEFAULT_LANGUAGE, MessageKey::TooManyAttempts)
                    .to_string(),
                details: Some(serde_json::json!({
                    "retry_after_minutes": retry_after_minutes
                })),
            };
            Ok((StatusCode::TOO_MANY_REQUESTS, out, Json(body)).into_response())
        }
        LoginOutcome::Denied => {
            let mut out = HeaderMap::new();
            clear_session_cookie(&state, &mut out);
            let body = ApiErrorResponse {
                error: "BANNED".to_string(),
                message: state
                    .messages
                    .get(DEFAULT_LANGUAGE, MessageKey::BannedAddress)
                    .to_string(),
                details: None,
            };
            Ok((StatusCode::FORBIDDEN, out, Json(body)).into_response())
        }
    }
}

/// The default action: try the remember-me cookie pair, then render.
async fn default_entry(
    state: &AppState,
    headers: &HeaderMap,
    ip: IpAddr,
    notice: Option<MessageKey>,
) -> Result<Response, AppError> {
    let (mut session, new_raw) = start_session(state, headers).await?;

    if !session.is_authenticated() {
        let username = cookies::extract_cookie(headers, USERNAME_COOKIE);
        let token = cookies::extract_cookie(headers, REMEMBER_COOKIE);

        if let (Some(username), Some(token)) = (username, token) {
            match state
                .login_flow
                .auto_login(&username, &token, ip, &mut session)
                .await?
            {
                Some(LoginOutcome::Success {
                    redirect,
                    user,
                    session_token,
                    remember,
                    notice,
                }) => {
                    let mut out = HeaderMap::new();
                    if let Some(raw) = session_token {
                        apply_session_cookie(state, &mut out, &raw);
                    }
                    apply_remember_cookies(state, &mut out, &remember);
                    apply_redirect(&mut out, &redirect);

                    if let Err(e) = state.autoclose_service.run().await {
                        error!(error = %e, "Stale-ticket auto-closure failed");
                    }

                    let notice =
                        notice.map(|key| state.messages.get(&user.language, key).to_string());
                    let body = ApiResponse::ok(LoginSuccessBody {
                        redirect,
                        user: (&user).into(),
                        notice,
                    });
                    return Ok((StatusCode::SEE_OTHER, out, Json(body)).into_response());
                }
                Some(LoginOutcome::Denied) => {
                    // Deny-listed address; valid cookies change nothing.
                    let body = ApiErrorResponse {
                        error: "BANNED".to_string(),
                        message: state
                            .messages
                            .get(DEFAULT_LANGUAGE, MessageKey::BannedAddress)
                            .to_string(),
                        details: None,
                    };
                    return Ok((StatusCode::FORBIDDEN, Json(body)).into_response());
                }
                _ => {
                    // Stale cookie pair; drop both and fall through to the form.
                    let mut out = HeaderMap::new();
                    clear_remember_cookies(state, &mut out);
                    let page = build_page(state, headers, &mut session, Vec::new(), notice).await?;
                    if let Some(raw) = new_raw {
                        apply_session_cookie(state, &mut out, &raw);
                    }
                    return Ok((out, Json(ApiResponse::ok(page))).into_response());
                }
            }
        }
    }

    respond_with_page(state, headers, &mut session, new_raw, Vec::new(), notice).await
}

/// The logout action: GET with a CSRF token.
async fn logout(
    state: &AppState,
    headers: &HeaderMap,
    token: Option<&str>,
) -> Result<Response, AppError> {
    let (mut session, new_raw) = start_session(state, headers).await?;

    if !session.is_authenticated() {
        return respond_with_page(state, headers, &mut session, new_raw, Vec::new(), None).await;
    }

    if !state
        .session_manager
        .verify_csrf(&session, token.unwrap_or_default())
    {
        // A forged logout link must not end the session.
        return respond_with_page(
            state,
            headers,
            &mut session,
            new_raw,
            Vec::new(),
            Some(MessageKey::InvalidToken),
        )
        .await;
    }

    state.session_manager.destroy(session.id).await?;

    let mut out = HeaderMap::new();
    // Keep the remembered username; the auto-login token dies with the
    // session.
    cookies::append_set_cookie(
        &mut out,
        &cookies::clear_cookie(REMEMBER_COOKIE, state.config.session.cookie_secure),
    );

    let (mut fresh, fresh_raw) = state.session_manager.start(None).await?;
    let page = build_page(
        state,
        headers,
        &mut fresh,
        Vec::new(),
        Some(MessageKey::LogoutSuccess),
    )
    .await?;
    if let Some(raw) = fresh_raw {
        apply_session_cookie(state, &mut out, &raw);
    }
    Ok((out, Json(ApiResponse::ok(page))).into_response())
}

/// The plain render action.
async fn render(
    state: &AppState,
    headers: &HeaderMap,
    notice: Option<MessageKey>,
) -> Result<Response, AppError> {
    let (mut session, new_raw) = start_session(state, headers).await?;
    respond_with_page(state, headers, &mut session, new_raw, Vec::new(), notice).await
}

async fn start_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(Session, Option<String>), AppError> {
    let cookie = cookies::extract_cookie(headers, state.session_manager.cookie_name());
    state.session_manager.start(cookie.as_deref()).await
}

/// Assemble the login form render state for this session.
///
/// Only the fact that a challenge is pending travels here; the expected
/// answer stays server-side and is fetched as an image separately.
async fn build_page(
    state: &AppState,
    headers: &HeaderMap,
    session: &mut Session,
    errors: Vec<FieldError>,
    notice: Option<MessageKey>,
) -> Result<LoginPageState, AppError> {
    let csrf_token = state.session_manager.issue_csrf(session).await?;
    let challenge_required = state.challenge_gate.required(session);

    let errors = errors
        .iter()
        .map(|e| FieldErrorBody {
            field: field_name(e).to_string(),
            message: state.messages.get(DEFAULT_LANGUAGE, e.message).to_string(),
        })
        .collect();

    Ok(LoginPageState {
        errors,
        notice: notice.map(|key| state.messages.get(DEFAULT_LANGUAGE, key).to_string()),
        remembered_username: cookies::extract_cookie(headers, USERNAME_COOKIE),
        challenge_required,
        csrf_token,
    })
}

/// GET /admin/login/image — the pending image challenge, rendered.
///
/// Issues a fresh code, stores only its keyed checksum in the session,
/// and hands the code to the configured renderer. The response is the
/// image alone; the code never appears in any JSON.
pub async fn challenge_image(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let ChallengeGate::Image(image) = state.challenge_gate.as_ref() else {
        return Err(AppError::not_found("No image challenge is configured"));
    };

    let (mut session, new_raw) = start_session(&state, &headers).await?;
    let (code, checksum) = image.issue();
    state
        .session_manager
        .set_challenge_checksum(&mut session, Some(checksum))
        .await?;

    let rendered = state.challenge_renderer.render(&code)?;

    let mut out = HeaderMap::new();
    if let Some(raw) = new_raw {
        apply_session_cookie(&state, &mut out, &raw);
    }
    out.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(rendered.content_type),
    );
    out.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    Ok((out, rendered.bytes).into_response())
}

async fn respond_with_page(
    state: &AppState,
    headers: &HeaderMap,
    session: &mut Session,
    new_raw: Option<String>,
    errors: Vec<FieldError>,
    notice: Option<MessageKey>,
) -> Result<Response, AppError> {
    let page = build_page(state, headers, session, errors, notice).await?;
    let mut out = HeaderMap::new();
    if let Some(raw) = new_raw {
        apply_session_cookie(state, &mut out, &raw);
    }
    Ok((out, Json(ApiResponse::ok(page))).into_response())
}

fn field_name(error: &FieldError) -> &'static str {
    use helpdesk_auth::login::FormField;
    match error.field {
        FormField::User => "user",
        FormField::Pass => "pass",
        FormField::Challenge => "challenge",
        FormField::Active => "active",
    }
}

fn notice_from_query(query: &LoginQuery) -> Option<MessageKey> {
    match query.notice.as_deref() {
        Some("session_expired") => Some(MessageKey::SessionExpired),
        _ => None,
    }
}

/// Point the response at the post-login landing target. The target was
/// sanitized by the flow; anything that still fails header encoding is
/// silently dropped, leaving the JSON `redirect` field authoritative.
fn apply_redirect(out: &mut HeaderMap, target: &str) {
    if let Ok(value) = HeaderValue::from_str(target) {
        out.insert(header::LOCATION, value);
    }
}

fn apply_session_cookie(state: &AppState, out: &mut HeaderMap, raw_token: &str) {
    let cookie = cookies::build_cookie(
        state.session_manager.cookie_name(),
        raw_token,
        state.config.session.ttl_seconds(),
        state.config.session.cookie_secure,
    );
    cookies::append_set_cookie(out, &cookie);
}

fn clear_session_cookie(state: &AppState, out: &mut HeaderMap) {
    let cookie = cookies::clear_cookie(
        state.session_manager.cookie_name(),
        state.config.session.cookie_secure,
    );
    cookies::append_set_cookie(out, &cookie);
}

fn clear_remember_cookies(state: &AppState, out: &mut HeaderMap) {
    let secure = state.config.session.cookie_secure;
    cookies::append_set_cookie(out, &cookies::clear_cookie(USERNAME_COOKIE, secure));
    cookies::append_set_cookie(out, &cookies::clear_cookie(REMEMBER_COOKIE, secure));
}

/// Apply the remember-me cookie policy a finished login decided on.
fn apply_remember_cookies(state: &AppState, out: &mut HeaderMap, action: &RememberAction) {
    let secure = state.config.session.cookie_secure;
    let max_age = state.config.auth.remember_ttl_days * 86_400;
    match action {
        RememberAction::SetAutoLogin { username, derived } => {
            cookies::append_set_cookie(
                out,
                &cookies::build_cookie(USERNAME_COOKIE, username, max_age, secure),
            );
            cookies::append_set_cookie(
                out,
                &cookies::build_cookie(REMEMBER_COOKIE, derived, max_age, secure),
            );
        }
        RememberAction::SetUsernameOnly { username } => {
            cookies::append_set_cookie(
                out,
                &cookies::build_cookie(USERNAME_COOKIE, username, max_age, secure),
            );
            cookies::append_set_cookie(out, &cookies::clear_cookie(REMEMBER_COOKIE, secure));
        }
        RememberAction::Clear => {
            clear_remember_cookies(state, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_login_points_location_at_the_target() {
        let mut out = HeaderMap::new();
        apply_redirect(&mut out, "/admin/home");
        assert_eq!(out.get(header::LOCATION).unwrap(), "/admin/home");
    }

    #[test]
    fn unencodable_target_sets_no_location() {
        let mut out = HeaderMap::new();
        apply_redirect(&mut out, "/admin/\u{1F4A9}");
        assert!(out.get(header::LOCATION).is_none());
    }
}
