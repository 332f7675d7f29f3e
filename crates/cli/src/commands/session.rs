//! Sign-in state commands.
//!
//! The CLI has no live session across invocations: `login` persists the
//! identity hint and later invocations act as that user until `logout` or
//! until the hint expires.

use std::io::Write;

use serde_json::json;

use marketplace_core::UserId;
use marketplace_storefront::AppContext;

use super::{CliError, emit};

/// Sign in as `user_id`.
pub async fn login<W: Write>(ctx: &AppContext, user_id: &str, out: &mut W) -> Result<(), CliError> {
    let user = UserId::parse(user_id)?;
    ctx.session().sign_in(user).await?;
    let identity = ctx.cart().identity().await;
    emit(out, &json!({ "success": true, "identity": identity }))
}

/// Sign out and forget the identity hint.
pub async fn logout<W: Write>(ctx: &AppContext, out: &mut W) -> Result<(), CliError> {
    ctx.session().sign_out().await?;
    let identity = ctx.cart().identity().await;
    emit(out, &json!({ "success": true, "identity": identity }))
}

/// Print the identity the next collection command would act as.
pub async fn whoami<W: Write>(ctx: &AppContext, out: &mut W) -> Result<(), CliError> {
    let identity = ctx.cart().identity().await;
    emit(out, &json!({ "identity": identity }))
}
