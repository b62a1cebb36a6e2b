/// Server-rendered HTML views
///
/// Pages are rendered directly into strings; there is no client-side
/// application and no template engine. Everything user-controlled goes
/// through [`escape`].

use axum::response::Html;
use nameplate_shared::models::{User, UserPage};

/// Flash-driven state of the login page.
#[derive(Debug, Default)]
pub struct LoginPage {
    pub link_sent: bool,
    pub token_expired: bool,
    pub account_created: bool,
    pub account_activated: bool,
    pub activation_invalid: bool,
    pub email_error: Option<String>,
}

/// Flash-driven state of the registration page.
#[derive(Debug, Default)]
pub struct RegisterPage {
    pub email_error: Option<String>,
    pub moniker_error: Option<String>,
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} — Nameplate</title>
</head>
<body>
<nav>
<a href="/">Nameplate</a>
<a href="/users">People</a>
<a href="/login">Log in</a>
<a href="/register">Register</a>
</nav>
<main>
{body}
</main>
</body>
</html>
"#
    ))
}

fn notice(text: &str) -> String {
    format!(r#"<p class="notice">{text}</p>"#)
}

fn field_error(text: &str) -> String {
    format!(r#"<p class="field-error">{}</p>"#, escape(text))
}

pub fn home(current: Option<&User>) -> Html<String> {
    let greeting = match current {
        Some(user) => format!(
            r#"<p>Signed in as <a href="/users/{}">{}</a>. <a href="/logout">Log out</a></p>"#,
            user.id,
            escape(&user.moniker)
        ),
        None => r#"<p><a href="/login">Log in</a> with just your email address.</p>"#.to_string(),
    };

    layout(
        "Welcome",
        &format!(
            r#"<h1>Nameplate</h1>
<p>Profile pages for people, no passwords attached.</p>
{greeting}"#
        ),
    )
}

pub fn login_form(page: &LoginPage) -> Html<String> {
    let mut notices = String::new();
    if page.link_sent {
        notices.push_str(&notice(
            "Check your inbox — a login link is on its way.",
        ));
    }
    if page.token_expired {
        notices.push_str(&notice(
            "That login link has expired. Request a fresh one below.",
        ));
    }
    if page.account_created {
        notices.push_str(&notice(
            "Account created. Follow the activation link we sent you.",
        ));
    }
    if page.account_activated {
        notices.push_str(&notice("Your account is activated. Log in below."));
    }
    if page.activation_invalid {
        notices.push_str(&notice(
            "That activation link is no longer valid.",
        ));
    }

    let email_error = page
        .email_error
        .as_deref()
        .map(field_error)
        .unwrap_or_default();

    layout(
        "Log in",
        &format!(
            r#"<h1>Log in</h1>
{notices}
<form method="post" action="/login">
<label for="email">Email address</label>
<input type="email" id="email" name="email">
{email_error}
<button type="submit">Email me a login link</button>
</form>"#
        ),
    )
}

pub fn register_form(page: &RegisterPage) -> Html<String> {
    let email_error = page
        .email_error
        .as_deref()
        .map(field_error)
        .unwrap_or_default();
    let moniker_error = page
        .moniker_error
        .as_deref()
        .map(field_error)
        .unwrap_or_default();

    layout(
        "Register",
        &format!(
            r#"<h1>Register</h1>
<form method="post" action="/register">
<label for="email">Email address</label>
<input type="email" id="email" name="email">
{email_error}
<label for="moniker">Moniker</label>
<input type="text" id="moniker" name="moniker">
{moniker_error}
<button type="submit">Create account</button>
</form>"#
        ),
    )
}

pub fn users_index(page: &UserPage) -> Html<String> {
    let mut items = String::new();
    for user in &page.users {
        items.push_str(&format!(
            r#"<li><a href="/users/{}">{}</a></li>
"#,
            user.id,
            escape(&user.moniker)
        ));
    }

    let mut pagination = String::new();
    if page.has_prev() {
        pagination.push_str(&format!(
            r#"<a rel="prev" href="/users?page={}">Newer</a> "#,
            page.page - 1
        ));
    }
    if page.has_next() {
        pagination.push_str(&format!(
            r#"<a rel="next" href="/users?page={}">Older</a>"#,
            page.page + 1
        ));
    }

    layout(
        "People",
        &format!(
            r#"<h1>People</h1>
<ul class="users">
{items}</ul>
<p>Page {} of {}</p>
{pagination}"#,
            page.page,
            page.total_pages()
        ),
    )
}

pub fn profile(user: &User, is_owner: bool) -> Html<String> {
    let owner_panel = if is_owner {
        format!(
            r#"<section class="owner">
<p>This is you ({}).</p>
<a href="/profile">Edit profile</a>
</section>"#,
            escape(&user.email)
        )
    } else {
        String::new()
    };

    layout(
        &escape(&user.moniker),
        &format!(
            r#"<h1>{}</h1>
<p>Member since {}</p>
{owner_panel}"#,
            escape(&user.moniker),
            user.created_at.format("%B %e, %Y")
        ),
    )
}

pub fn dashboard() -> Html<String> {
    layout("Dashboard", "<h1>Dashboard</h1>\n<p>Nothing here yet.</p>")
}

pub fn not_found() -> Html<String> {
    layout(
        "Not found",
        r#"<h1>Page not found</h1>
<p>Nobody by that name around here. <a href="/users">Browse people</a> instead.</p>"#,
    )
}

pub fn internal_error() -> Html<String> {
    layout(
        "Something went wrong",
        r#"<h1>Something went wrong</h1>
<p>It's not you, it's us. Please try again.</p>"#,
    )
}

/// Minimal HTML escaping for text interpolated into markup.
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
