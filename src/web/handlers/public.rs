use crate::models::PostWithRelations;
use crate::services::{categories, comments, posts, tags};
use crate::web::error::AppResult;
use crate::web::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tera::Context;

fn make_context(state: &AppState) -> Context {
    let mut ctx = Context::new();
    ctx.insert("site", &state.config.site);
    ctx
}

fn not_found(state: &AppState) -> AppResult<Response> {
    let ctx = make_context(state);
    let html = state.templates.render("404.html", &ctx)?;
    Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
}

const MAX_PAGE: usize = 10000;

#[derive(Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    page: usize,
}

fn default_page() -> usize {
    1
}

fn clamp_page(page: usize) -> usize {
    page.clamp(1, MAX_PAGE)
}

#[derive(Deserialize)]
pub struct PostQuery {
    submitted: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CommentForm {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub text: String,
}

pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Html<String>> {
    let per_page = state.config.content.posts_per_page;
    let total = posts::count_published_posts(&state.db)?.max(0) as usize;
    let total_pages = total.div_ceil(per_page).max(1);
    // Past-the-end pages show the last page instead of an empty list.
    let page = clamp_page(pagination.page).min(total_pages);
    let offset = (page - 1) * per_page;

    let posts = posts::list_published_posts(&state.db, per_page, offset)?;
    let categories = categories::list_categories(&state.db)?;

    let mut ctx = make_context(&state);
    ctx.insert("posts", &posts);
    ctx.insert("categories", &categories);
    ctx.insert("page", &page);
    ctx.insert("total_pages", &total_pages);

    let html = state.templates.render("post_list.html", &ctx)?;
    Ok(Html(html))
}

pub async fn post(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(query): Query<PostQuery>,
) -> AppResult<Response> {
    match posts::get_published_post(&state.db, &slug)? {
        Some(post) => render_post(
            &state,
            &post,
            &CommentForm::default(),
            query.submitted.is_some(),
            None,
            StatusCode::OK,
        ),
        None => not_found(&state),
    }
}

pub async fn submit_comment(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Form(form): Form<CommentForm>,
) -> AppResult<Response> {
    let post = match posts::get_published_post(&state.db, &slug)? {
        Some(p) => p,
        None => return not_found(&state),
    };

    if let Err(e) = comments::validate_comment(&form.author, &form.text) {
        return render_post(
            &state,
            &post,
            &form,
            false,
            Some(e.to_string()),
            StatusCode::UNPROCESSABLE_ENTITY,
        );
    }

    comments::create_comment(&state.db, post.post.id, &form.author, &form.text)?;
    Ok(Redirect::to(&format!("/post/{}?submitted=1", post.post.slug)).into_response())
}

fn render_post(
    state: &AppState,
    post: &PostWithRelations,
    form: &CommentForm,
    submitted: bool,
    error: Option<String>,
    status: StatusCode,
) -> AppResult<Response> {
    let comments = comments::list_public_comments(&state.db, post.post.id)?;

    let mut ctx = make_context(state);
    ctx.insert("post", post);
    ctx.insert("comments", &comments);
    ctx.insert("form", form);
    ctx.insert("submitted", &submitted);
    ctx.insert("error", &error);

    let html = state.templates.render("post_detail.html", &ctx)?;
    Ok((status, Html(html)).into_response())
}

pub async fn category_posts(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> AppResult<Response> {
    let category = match categories::get_category_by_slug(&state.db, &slug)? {
        Some(c) => c,
        None => return not_found(&state),
    };
    let posts = posts::list_posts_by_category(&state.db, category.id)?;

    let mut ctx = make_context(&state);
    ctx.insert("heading", &format!("Category: {}", category.name));
    ctx.insert("posts", &posts);

    let html = state.templates.render("posts_by.html", &ctx)?;
    Ok(Html(html).into_response())
}

pub async fn tag_posts(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> AppResult<Response> {
    let tag = match tags::get_tag_by_slug(&state.db, &slug)? {
        Some(t) => t,
        None => return not_found(&state),
    };
    let posts = posts::list_posts_by_tag(&state.db, tag.id)?;

    let mut ctx = make_context(&state);
    ctx.insert("heading", &format!("Tag: {}", tag.name));
    ctx.insert("posts", &posts);

    let html = state.templates.render("posts_by.html", &ctx)?;
    Ok(Html(html).into_response())
}
