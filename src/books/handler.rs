//! HTTP handlers for `/api/books` and `/api/books/:id`.
//!
//! Every client-side problem answers 200 with a fixed plain-text message.
//! Store failures are a 500 on the collection routes, but on the single-book
//! routes they are reported exactly like a missing book.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::{
    AddCommentParams, COMPLETE_DELETE_SUCCESSFUL, CreateBookParams, DELETE_SUCCESSFUL, NO_BOOK_EXISTS,
    NewBook, NewComment, Payload,
};
use crate::error::StoreError;
use crate::handler::AppState;
use crate::model::{BookDetail, BookId};
use crate::unpack_error;

fn text(msg: impl Into<String>) -> Response {
    (StatusCode::OK, msg.into()).into_response()
}

fn no_book() -> Response {
    text(NO_BOOK_EXISTS)
}

fn server_error(msg: &'static str) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response()
}

fn log_store_error(action: &str, e: &StoreError) {
    tracing::error!(error = %unpack_error(e), "failed to {}", action);
}

// ============================================================================
// Collection
// ============================================================================

pub async fn list_books(State(state): State<AppState>) -> Response {
    match state.store.find_all().await {
        Ok(books) => {
            tracing::info!(count = books.len(), "listed books");
            Json(books).into_response()
        }
        Err(e) => {
            log_store_error("list books", &e);
            server_error("Database query error")
        }
    }
}

pub async fn create_book(
    State(state): State<AppState>,
    Payload(params): Payload<CreateBookParams>,
) -> Response {
    let input = match NewBook::try_from(params) {
        Ok(input) => input,
        Err(missing) => return text(missing.to_string()),
    };

    match state.store.insert(&input.title).await {
        Ok(book) => {
            tracing::info!(id = %book.id, "created book");
            Json(book.created()).into_response()
        }
        Err(e) => {
            log_store_error("create book", &e);
            server_error("Could not save book")
        }
    }
}

pub async fn delete_all_books(State(state): State<AppState>) -> Response {
    match state.store.delete_all().await {
        Ok(result) if result.acknowledged => {
            tracing::info!(deleted = result.deleted, "deleted all books");
            text(COMPLETE_DELETE_SUCCESSFUL)
        }
        Ok(_) => {
            tracing::error!("delete of all books was not acknowledged");
            server_error("Could not delete books")
        }
        Err(e) => {
            log_store_error("delete all books", &e);
            server_error("Could not delete books")
        }
    }
}

// ============================================================================
// Single book
// ============================================================================

pub async fn get_book(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Ok(id) = BookId::parse(&id) else {
        return no_book();
    };

    match state.store.find_by_id(&id).await {
        Ok(Some(book)) => Json(BookDetail::from(book)).into_response(),
        Ok(None) => no_book(),
        Err(e) => {
            log_store_error("get book", &e);
            no_book()
        }
    }
}

pub async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Payload(params): Payload<AddCommentParams>,
) -> Response {
    let Ok(id) = BookId::parse(&id) else {
        return no_book();
    };

    let input = match NewComment::try_from(params) {
        Ok(input) => input,
        Err(missing) => return text(missing.to_string()),
    };

    let mut book = match state.store.find_by_id(&id).await {
        Ok(Some(book)) => book,
        Ok(None) => return no_book(),
        Err(e) => {
            log_store_error("find book for comment", &e);
            return no_book();
        }
    };

    // Read-modify-write with no version check: concurrent appends are last write wins.
    book.push_comment(input.comment);

    match state.store.save(&book).await {
        Ok(Some(saved)) => {
            tracing::info!(id = %saved.id, comments = saved.comment_count, "added comment");
            Json(BookDetail::from(saved)).into_response()
        }
        Ok(None) => no_book(),
        Err(e) => {
            log_store_error("save comment", &e);
            no_book()
        }
    }
}

pub async fn delete_book(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Ok(id) = BookId::parse(&id) else {
        return no_book();
    };

    match state.store.delete_by_id(&id).await {
        Ok(Some(book)) => {
            tracing::info!(id = %book.id, "deleted book");
            text(DELETE_SUCCESSFUL)
        }
        Ok(None) => no_book(),
        Err(e) => {
            log_store_error("delete book", &e);
            no_book()
        }
    }
}
