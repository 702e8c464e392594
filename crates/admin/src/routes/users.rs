//! CMS user management route handlers.
//!
//! Admins may not delete their own account or clear their own admin flag,
//! so the panel always keeps at least the acting administrator.

use askama::Template;
use axum::{
    Form,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use kestrel_core::UserId;
use kestrel_core::catalog::{User, UserInput, ValidationErrors};
use kestrel_core::db::UserRepository;

use crate::{
    error::{AppError, Result},
    filters,
    forms::{UserForm, single_error},
    middleware::RequireAdminAuth,
    models::{CurrentAdmin, session_keys},
    services::hash_password_blocking,
    state::AppState,
};

use super::{
    conflict_as_field_error, dashboard::AdminUserView, format_timestamp, render, render_invalid,
};

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub is_self: bool,
    pub created: String,
}

#[derive(Template)]
#[template(path = "users/index.html")]
pub struct UsersIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub users: Vec<UserRow>,
}

#[derive(Template)]
#[template(path = "users/form.html")]
pub struct UserFormTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub user_id: Option<i32>,
    pub is_self: bool,
    pub form: UserForm,
    pub errors: ValidationErrors,
}

impl UserFormTemplate {
    fn new(
        admin: &CurrentAdmin,
        user_id: Option<UserId>,
        form: UserForm,
        errors: ValidationErrors,
    ) -> Self {
        Self {
            admin_user: AdminUserView::from(admin),
            current_path: "/users".to_string(),
            user_id: user_id.map(|id| id.as_i32()),
            is_self: user_id == Some(admin.id),
            form,
            errors,
        }
    }

    fn action(&self) -> String {
        self.user_id
            .map_or_else(|| "/users".to_owned(), |id| format!("/users/{id}"))
    }
}

#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Html<String>> {
    let users = UserRepository::new(state.pool()).list().await?;

    let template = UsersIndexTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/users".to_string(),
        users: users
            .iter()
            .map(|u| UserRow {
                id: u.id.as_i32(),
                name: u.name.clone(),
                email: u.email.to_string(),
                is_admin: u.is_admin,
                is_self: u.id == admin.id,
                created: format_timestamp(u.created_at),
            })
            .collect(),
    };

    Ok(render(&template))
}

#[instrument(skip(admin))]
pub async fn new(RequireAdminAuth(admin): RequireAdminAuth) -> Html<String> {
    render(&UserFormTemplate::new(
        &admin,
        None,
        UserForm::default(),
        ValidationErrors::new(),
    ))
}

/// Create user handler. A password is mandatory for new accounts.
#[instrument(skip(admin, state, form), fields(email = %form.email.trim()))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Form(form): Form<UserForm>,
) -> Result<Response> {
    let errors = match form.to_draft().validate(true) {
        Ok(input) => {
            let password = input.password.as_deref().unwrap_or_default();
            let hash = hash_password_blocking(password)
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?;
            match UserRepository::new(state.pool())
                .create(&input.name, &input.email, &hash, input.is_admin)
                .await
            {
                Ok(user) => {
                    tracing::info!(user_id = %user.id, created_by = %admin.id, "User created");
                    return Ok(Redirect::to("/users").into_response());
                }
                Err(e) => conflict_as_field_error(e, "email")?,
            }
        }
        Err(errors) => errors,
    };

    Ok(render_invalid(&UserFormTemplate::new(&admin, None, form, errors)))
}

#[instrument(skip(admin, state))]
pub async fn edit(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Html<String>> {
    let user = find(&state, id).await?;
    Ok(render(&UserFormTemplate::new(
        &admin,
        Some(id),
        UserForm::from_user(&user),
        ValidationErrors::new(),
    )))
}

/// Update user handler. A blank password leaves the stored hash alone.
#[instrument(skip(admin, state, session, form))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<UserId>,
    Form(form): Form<UserForm>,
) -> Result<Response> {
    find(&state, id).await?;

    let errors = match form.to_draft().validate(false) {
        Ok(input) if id == admin.id && !input.is_admin => {
            single_error("is_admin", "you cannot remove your own admin access")
        }
        Ok(input) => match save(&state, id, &input).await {
            Ok(user) => {
                if user.id == admin.id {
                    session
                        .insert(session_keys::CURRENT_ADMIN, CurrentAdmin::from(&user))
                        .await?;
                }
                tracing::info!(user_id = %id, "User updated");
                return Ok(Redirect::to("/users").into_response());
            }
            Err(AppError::Database(e)) => conflict_as_field_error(e, "email")?,
            Err(e) => return Err(e),
        },
        Err(errors) => errors,
    };

    Ok(render_invalid(&UserFormTemplate::new(&admin, Some(id), form, errors)))
}

/// Hash any new password before touching the row, then write everything in
/// one statement.
async fn save(state: &AppState, id: UserId, input: &UserInput) -> Result<User> {
    let hash = match &input.password {
        Some(password) => Some(
            hash_password_blocking(password)
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?,
        ),
        None => None,
    };

    Ok(UserRepository::new(state.pool())
        .update(id, &input.name, &input.email, input.is_admin, hash.as_deref())
        .await?)
}

#[instrument(skip(admin, state))]
pub async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Redirect> {
    if id == admin.id {
        return Err(AppError::Forbidden(
            "you cannot delete your own account".to_string(),
        ));
    }

    UserRepository::new(state.pool()).delete(id).await?;
    tracing::info!(user_id = %id, deleted_by = %admin.id, "User deleted");
    Ok(Redirect::to("/users"))
}

async fn find(state: &AppState, id: UserId) -> Result<User> {
    UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use kestrel_core::Email;

    fn admin() -> CurrentAdmin {
        CurrentAdmin {
            id: UserId::new(7),
            email: Email::parse("ops@kestrel-switchgear.com").unwrap(),
            name: "Ops".to_string(),
        }
    }

    #[test]
    fn test_form_knows_when_editing_self() {
        let page = UserFormTemplate::new(
            &admin(),
            Some(UserId::new(7)),
            UserForm::default(),
            ValidationErrors::new(),
        );
        assert!(page.is_self);
        assert_eq!(page.action(), "/users/7");

        let page =
            UserFormTemplate::new(&admin(), None, UserForm::default(), ValidationErrors::new());
        assert!(!page.is_self);
        assert_eq!(page.action(), "/users");
    }
}
