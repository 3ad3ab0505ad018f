//! HTML views: login, utility panel, URL panel, collection page
//!
//! Pages are rendered server-side as strings, with a small inline script
//! driving the JSON endpoints from the collection page.

use axum::extract::{Query, State};
use axum::response::Html;
use cmdanno_common::db::models::status;
use serde::Deserialize;
use std::collections::HashSet;

use super::auth::Annotator;
use super::ApiError;
use crate::db::{annotations, content, progress};
use crate::grouping::group_for_display;
use crate::AppState;

const STYLE: &str = r#"
    body {
        font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
        background-color: #1a1a1a;
        color: #e0e0e0;
        line-height: 1.6;
        margin: 0;
    }
    header {
        background-color: #2a2a2a;
        border-bottom: 1px solid #3a3a3a;
        padding: 16px 24px;
    }
    h1 { font-size: 24px; margin: 0; color: #4a9eff; }
    .subtitle { color: #888; font-size: 14px; }
    .container { padding: 24px; }
    a { color: #4a9eff; text-decoration: none; }
    a:hover { text-decoration: underline; }
    .in-progress { color: #e0b84a; }
    .completed { color: #6ccb5f; }
    .others-in-progress { color: #888; }
    .group { display: flex; gap: 48px; margin-bottom: 24px; }
    .column { list-style: none; margin: 0; padding: 0; min-width: 240px; }
    .column li { padding: 2px 0; }
    .url-list { list-style: none; padding: 0; }
    .url-list li { padding: 4px 0; }
    .annotation-list { list-style: none; padding: 0; }
    .annotation-list li {
        background-color: #242424;
        border: 1px solid #3a3a3a;
        border-radius: 4px;
        padding: 8px 12px;
        margin-bottom: 8px;
    }
    .annotation-list code { color: #6ccb5f; display: block; }
    .annotation-list .nl { color: #e0e0e0; }
    button {
        background-color: #2f6fb3;
        border: none;
        border-radius: 4px;
        color: #fff;
        padding: 6px 14px;
        margin-right: 8px;
        cursor: pointer;
    }
    button.subtle { background-color: #3a3a3a; }
    input[type=text] {
        background-color: #242424;
        border: 1px solid #3a3a3a;
        border-radius: 4px;
        color: #e0e0e0;
        padding: 6px 8px;
        width: 480px;
        margin-bottom: 8px;
    }
    .toolbar { margin: 16px 0; }
    .banner { color: #6ccb5f; margin: 8px 0; }
"#;

/// Minimal HTML escaping for text interpolated into pages
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Percent-encode a query-string value
fn encode_query(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

fn page_shell(title: &str, subtitle: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{STYLE}</style>
</head>
<body>
    <header>
        <h1>{title}</h1>
        <div class="subtitle">{subtitle}</div>
    </header>
    <div class="container">
{body}
    </div>
</body>
</html>
"#,
        title = escape_html(title),
        subtitle = escape_html(subtitle),
        body = body,
    ))
}

const LOGIN_BODY: &str = r#"
    <h2>Log in</h2>
    <div>
        <input type="text" id="access-code" placeholder="access code">
        <button onclick="doLogin()">Log in</button>
    </div>
    <h2>Register</h2>
    <div>
        <input type="text" id="first-name" placeholder="first name">
        <input type="text" id="last-name" placeholder="last name">
        <button onclick="doRegister()">Register</button>
    </div>
    <p id="message" class="banner"></p>
    <script>
    function show(text) {
        document.getElementById('message').textContent = text;
    }
    async function doLogin() {
        const code = document.getElementById('access-code').value;
        const resp = await fetch('/login?access_code=' + encodeURIComponent(code));
        const data = await resp.json();
        if (data.status === 'LOGIN_SUCCESS') {
            window.location = '/utility_panel';
        } else {
            show('No such user: ' + code);
        }
    }
    async function doRegister() {
        const first = document.getElementById('first-name').value;
        const last = document.getElementById('last-name').value;
        const resp = await fetch('/register?firstname=' + encodeURIComponent(first)
            + '&lastname=' + encodeURIComponent(last));
        const data = await resp.json();
        if (data.status === 'REGISTRATION_SUCCESS') {
            show('Registered. Your access code is: ' + data.access_code);
        } else {
            show('A user named ' + first + ' ' + last + ' is already registered.');
        }
    }
    </script>
"#;

/// The login view, also used as the fallback for unauthenticated requests
pub fn login_html() -> Html<String> {
    page_shell(
        "cmdanno",
        "Natural language to command-line annotation",
        LOGIN_BODY,
    )
}

/// GET /
pub async fn login_page() -> Html<String> {
    login_html()
}

/// GET /utility_panel
///
/// All utilities with tagged pages, most-used first, excluding the
/// configured allow-override and deny lists, in display groups of 20 split
/// into two columns of up to 10.
pub async fn utility_panel(
    State(state): State<AppState>,
    Annotator(user): Annotator,
) -> Result<Html<String>, ApiError> {
    let in_progress: HashSet<String> =
        content::tags_in_progress(&state.db).await?.into_iter().collect();

    let utilities: Vec<(String, i64, bool)> = content::tag_usage_counts(&state.db)
        .await?
        .into_iter()
        .filter(|(tag, _)| !state.config.is_excluded(tag))
        .map(|(tag, count)| {
            let started = in_progress.contains(&tag);
            (tag, count, started)
        })
        .collect();

    let mut body = String::new();
    for group in group_for_display(&utilities) {
        body.push_str("        <div class=\"group\">\n");
        for column in [&group.left, &group.right] {
            if column.is_empty() {
                continue;
            }
            body.push_str("            <ul class=\"column\">\n");
            for (tag, count, started) in column {
                let marker = if *started { " in-progress" } else { "" };
                body.push_str(&format!(
                    "                <li><a class=\"utility{marker}\" href=\"/url_panel?utility={href}\">{name}</a> ({count})</li>\n",
                    marker = marker,
                    href = encode_query(tag),
                    name = escape_html(tag),
                    count = count,
                ));
            }
            body.push_str("            </ul>\n");
        }
        body.push_str("        </div>\n");
    }
    if utilities.is_empty() {
        body.push_str("        <p>No utilities imported yet.</p>\n");
    }

    Ok(page_shell(
        "Utilities",
        &format!("Logged in as {}", user.access_code),
        &body,
    ))
}

#[derive(Debug, Deserialize)]
pub struct UrlPanelParams {
    #[serde(default)]
    pub utility: String,
}

/// GET /url_panel
///
/// The utility's pages in lexicographic order, each with the current
/// user's progress status, or "others-in-progress" when only other
/// annotators have submitted for it.
pub async fn url_panel(
    State(state): State<AppState>,
    Annotator(user): Annotator,
    Query(params): Query<UrlPanelParams>,
) -> Result<Html<String>, ApiError> {
    let utility = params.utility.trim();
    let urls = content::urls_for_tag(&state.db, utility).await?;
    let own_statuses = progress::statuses_for_annotator(&state.db, user.id).await?;
    let annotated: HashSet<String> = annotations::urls_with_annotations(&state.db)
        .await?
        .into_iter()
        .collect();

    let mut body = String::from("        <ul class=\"url-list\">\n");
    for url in &urls {
        let url_status = match own_statuses.get(url) {
            Some(s) => s.clone(),
            None if annotated.contains(url) => status::OTHERS_IN_PROGRESS.to_string(),
            None => String::new(),
        };
        body.push_str(&format!(
            "            <li><a href=\"/collect_page?utility={utility_href}&url={url_href}\">{url_text}</a> <span class=\"{class}\">{label}</span></li>\n",
            utility_href = encode_query(utility),
            url_href = encode_query(url),
            url_text = escape_html(url),
            class = escape_html(&url_status),
            label = escape_html(&url_status),
        ));
    }
    body.push_str("        </ul>\n");
    if urls.is_empty() {
        body.push_str("        <p>No pages tagged with this utility.</p>\n");
    }
    body.push_str("        <p><a href=\"/utility_panel\">Back to utilities</a></p>\n");

    Ok(page_shell(
        &format!("Pages for {}", utility),
        &format!("Logged in as {}", user.access_code),
        &body,
    ))
}

#[derive(Debug, Deserialize)]
pub struct CollectPageParams {
    #[serde(default)]
    pub utility: String,
    #[serde(default)]
    pub url: String,
}

const COLLECT_SCRIPT: &str = r#"
    function call(path, params) {
        const query = new URLSearchParams(params).toString();
        return fetch(path + '?' + query).then(resp => resp.json());
    }
    async function submitAnnotation() {
        const nl = document.getElementById('nl-input').value;
        const command = document.getElementById('command-input').value;
        await call('/submit_annotation', {url: PAGE_URL, nl: nl, utility: UTILITY, command: command});
        window.location.reload();
    }
    async function editAnnotation(originalNl, originalCommand) {
        const command = prompt('Command:', originalCommand);
        if (command === null) return;
        const nl = prompt('Description:', originalNl);
        if (nl === null) return;
        await call('/submit_edit', {url: PAGE_URL, original_nl: originalNl,
            original_command: originalCommand, nl: nl, command: command});
        window.location.reload();
    }
    async function deleteAnnotation(nl, command) {
        await call('/delete_annotation', {url: PAGE_URL, nl: nl, command: command});
        window.location.reload();
    }
    async function setProgress(progressStatus) {
        await call('/update_progress', {url: PAGE_URL, status: progressStatus});
        window.location.reload();
    }
    async function goPrevious() {
        const data = await call('/previous_url', {utility: UTILITY, url: PAGE_URL});
        if (data.status === 'PREVIOUS_URL_SUCCESS') {
            window.location = '/collect_page?utility=' + encodeURIComponent(UTILITY)
                + '&url=' + encodeURIComponent(data.url);
        } else if (data.status === 'IS_FIRST_URL') {
            alert('This is the first page for ' + UTILITY + '.');
        } else {
            alert('This page is not in the sequence for ' + UTILITY + '.');
        }
    }
    async function goNext() {
        const data = await call('/next_url', {utility: UTILITY, url: PAGE_URL});
        if (data.status === 'NEXT_URL_SUCCESS') {
            window.location = '/collect_page?utility=' + encodeURIComponent(UTILITY)
                + '&url=' + encodeURIComponent(data.url);
        } else if (data.status === 'IS_LAST_URL') {
            alert('This is the last page for ' + UTILITY + '.');
        } else {
            alert('This page is not in the sequence for ' + UTILITY + '.');
        }
    }
    async function doLogout() {
        await call('/logout', {});
        window.location = '/';
    }
"#;

/// GET /collect_page
///
/// The annotation workspace for one page: existing annotations visible to
/// the user (all annotators' for admins), the submission form, navigation,
/// and the completion toggle.
pub async fn collect_page(
    State(state): State<AppState>,
    Annotator(user): Annotator,
    Query(params): Query<CollectPageParams>,
) -> Result<Html<String>, ApiError> {
    let utility = params.utility.trim().to_string();
    let url_id = content::get_or_create_url(&state.db, &params.url).await?;
    let url = content::url_text(&state.db, url_id).await?;

    let scope = if user.is_admin { None } else { Some(user.id) };
    let annotation_list = annotations::list_for_url(&state.db, url_id, scope).await?;

    let completed = matches!(
        progress::get(&state.db, user.id, url_id).await?,
        Some(record) if record.status == status::COMPLETED
    );

    let viewer_url = format!("{}{}", state.config.viewer_prefix, url);

    let mut body = String::new();
    body.push_str(&format!(
        "        <p>Annotating <a href=\"{viewer}\" target=\"_blank\">{url_text}</a> for <b>{utility_text}</b></p>\n",
        viewer = escape_html(&viewer_url),
        url_text = escape_html(&url),
        utility_text = escape_html(&utility),
    ));
    if completed {
        body.push_str("        <p class=\"banner completed\">You marked this page completed.</p>\n");
    }

    body.push_str("        <ul class=\"annotation-list\">\n");
    for annotation in &annotation_list {
        let nl_js = serde_json::to_string(&annotation.nl).unwrap_or_default();
        let command_js = serde_json::to_string(&annotation.command).unwrap_or_default();
        body.push_str(&format!(
            "            <li><code>{command}</code><span class=\"nl\">{nl}</span>\
 <button class=\"subtle\" onclick='editAnnotation({nl_js}, {command_js})'>Edit</button>\
 <button class=\"subtle\" onclick='deleteAnnotation({nl_js}, {command_js})'>Delete</button></li>\n",
            command = escape_html(&annotation.command),
            nl = escape_html(&annotation.nl),
            nl_js = escape_html(&nl_js),
            command_js = escape_html(&command_js),
        ));
    }
    body.push_str("        </ul>\n");

    body.push_str(
        r#"        <h2>New annotation</h2>
        <div>
            <input type="text" id="nl-input" placeholder="natural language description"><br>
            <input type="text" id="command-input" placeholder="command"><br>
            <button onclick="submitAnnotation()">Submit</button>
        </div>
        <div class="toolbar">
            <button class="subtle" onclick="goPrevious()">Previous page</button>
            <button class="subtle" onclick="goNext()">Next page</button>
"#,
    );
    if completed {
        body.push_str(
            "            <button class=\"subtle\" onclick=\"setProgress('in-progress')\">Reopen</button>\n",
        );
    } else {
        body.push_str(
            "            <button onclick=\"setProgress('completed')\">Mark completed</button>\n",
        );
    }
    body.push_str(
        r#"            <button class="subtle" onclick="doLogout()">Log out</button>
        </div>
"#,
    );
    body.push_str(&format!(
        "        <p><a href=\"/url_panel?utility={href}\">Back to page list</a></p>\n",
        href = encode_query(&utility),
    ));

    body.push_str(&format!(
        "        <script>\n        const UTILITY = {utility_js};\n        const PAGE_URL = {url_js};\n{COLLECT_SCRIPT}        </script>\n",
        utility_js = serde_json::to_string(&utility).unwrap_or_default(),
        url_js = serde_json::to_string(&url).unwrap_or_default(),
    ));

    Ok(page_shell(
        "Collect annotations",
        &format!("Logged in as {}", user.access_code),
        &body,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_html_covers_markup_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn encode_query_leaves_unreserved_untouched() {
        assert_eq!(encode_query("abc-DEF_1.2~"), "abc-DEF_1.2~");
        assert_eq!(encode_query("a b&c"), "a%20b%26c");
        assert_eq!(
            encode_query("http://x.com/?q=1"),
            "http%3A%2F%2Fx.com%2F%3Fq%3D1"
        );
    }
}
