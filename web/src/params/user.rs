use domain::user::{Credentials, NewUser};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({
    "first_name": "Ada",
    "last_name": "Lovelace",
    "email": "ada@example.com",
    "password": "analytical-engine"
}))]
pub(crate) struct RegisterParams {
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) email: String,
    pub(crate) password: String,
}

impl From<RegisterParams> for NewUser {
    fn from(params: RegisterParams) -> Self {
        NewUser {
            first_name: params.first_name,
            last_name: params.last_name,
            email: params.email,
            password: params.password,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct LoginParams {
    pub(crate) email: String,
    pub(crate) password: String,
}

impl From<LoginParams> for Credentials {
    fn from(params: LoginParams) -> Self {
        Credentials {
            email: params.email,
            password: params.password,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct ForgotPasswordParams {
    pub(crate) email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({
    "reset_token": "908447",
    "new_password": "difference-engine"
}))]
pub(crate) struct ResetPasswordParams {
    pub(crate) reset_token: String,
    pub(crate) new_password: String,
}
