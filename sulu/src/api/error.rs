// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::hash::{HashError, INVALID_HASH_CODE};
use crate::routing::RouteError;
use crate::structure::StructureError;
use crate::tags::TagError;
use crate::trash::TrashError;
use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde_json::json;

pub fn json_error_response(message: &str, status_code: StatusCode) -> HttpResponse {
    HttpResponse::build(status_code).json(json!({
        "success": false,
        "message": message
    }))
}

/// Logs the detailed error and hands the client a generic message.
pub fn log_and_return_generic_error(
    operation: &str,
    error: &dyn std::fmt::Display,
    status_code: StatusCode,
) -> HttpResponse {
    log::error!("Failed to {}: {}", operation, error);
    let generic_message = match status_code {
        StatusCode::BAD_REQUEST => "Invalid input provided",
        StatusCode::CONFLICT => "Resource already exists",
        StatusCode::NOT_FOUND => "Resource not found",
        StatusCode::INTERNAL_SERVER_ERROR => "An internal error occurred",
        _ => "An error occurred",
    };
    json_error_response(generic_message, status_code)
}

pub fn route_error_response(operation: &str, err: &RouteError) -> HttpResponse {
    match err {
        RouteError::NotFound(_) => json_error_response(&err.to_string(), StatusCode::NOT_FOUND),
        RouteError::InvalidPath(_) => json_error_response(&err.to_string(), StatusCode::BAD_REQUEST),
        RouteError::AlreadyExists { .. } | RouteError::ActiveRoute(_) => {
            json_error_response(&err.to_string(), StatusCode::CONFLICT)
        }
        RouteError::InvalidHash(hash_err) => hash_error_response(operation, hash_err),
        RouteError::Storage(_) => {
            log_and_return_generic_error(operation, err, StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub fn structure_error_response(operation: &str, err: &StructureError) -> HttpResponse {
    match err {
        StructureError::DocumentTypeNotFound(_) | StructureError::StructureTypeNotFound { .. } => {
            json_error_response(&err.to_string(), StatusCode::NOT_FOUND)
        }
        _ => log_and_return_generic_error(operation, err, StatusCode::INTERNAL_SERVER_ERROR),
    }
}

pub fn trash_error_response(operation: &str, err: &TrashError) -> HttpResponse {
    match err {
        TrashError::NotFound(_) => json_error_response(&err.to_string(), StatusCode::NOT_FOUND),
        TrashError::UnknownResource(_) => {
            json_error_response(&err.to_string(), StatusCode::BAD_REQUEST)
        }
        TrashError::Conflict(_) => json_error_response(&err.to_string(), StatusCode::CONFLICT),
        TrashError::InvalidData(_) | TrashError::Storage(_) => {
            log_and_return_generic_error(operation, err, StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub fn tag_error_response(operation: &str, err: &TagError) -> HttpResponse {
    match err {
        TagError::NotFound(_) => json_error_response(&err.to_string(), StatusCode::NOT_FOUND),
        TagError::InvalidName(_) | TagError::InvalidId(_) => {
            json_error_response(&err.to_string(), StatusCode::BAD_REQUEST)
        }
        TagError::Conflict(_) => json_error_response(&err.to_string(), StatusCode::CONFLICT),
        TagError::Storage(_) => {
            log_and_return_generic_error(operation, err, StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// 409 with the code clients check before offering a forced save.
pub fn hash_error_response(operation: &str, err: &HashError) -> HttpResponse {
    match err {
        HashError::InvalidHash { .. } => HttpResponse::Conflict().json(json!({
            "code": INVALID_HASH_CODE,
            "message": err.to_string()
        })),
        HashError::Serialize(_) => {
            log_and_return_generic_error(operation, err, StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_errors_map_to_statuses() {
        let cases = [
            (RouteError::NotFound("/a".to_string()), StatusCode::NOT_FOUND),
            (RouteError::InvalidPath("a".to_string()), StatusCode::BAD_REQUEST),
            (
                RouteError::AlreadyExists {
                    path: "/a".to_string(),
                    entity_id: "1".to_string(),
                },
                StatusCode::CONFLICT,
            ),
            (RouteError::ActiveRoute("/a".to_string()), StatusCode::CONFLICT),
            (
                RouteError::InvalidHash(HashError::InvalidHash {
                    expected: "a".to_string(),
                    received: "b".to_string(),
                }),
                StatusCode::CONFLICT,
            ),
            (RouteError::Storage("disk".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(route_error_response("test", &err).status(), status);
        }
    }

    #[test]
    fn trash_errors_map_to_statuses() {
        assert_eq!(
            trash_error_response("test", &TrashError::UnknownResource("x".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            trash_error_response("test", &TrashError::Conflict("x".to_string())).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn invalid_hash_is_conflict() {
        let err = HashError::InvalidHash {
            expected: "a".to_string(),
            received: "b".to_string(),
        };
        assert_eq!(hash_error_response("test", &err).status(), StatusCode::CONFLICT);
    }
}
