#[cfg(test)]
mod tests {

    mod slug_tests {
        use crate::services::slug::{
            assign_slug, base_slug, generate_slug, needs_repair, validate_slug, SlugError,
            SlugScope,
        };
        use std::collections::HashSet;
        use std::convert::Infallible;

        fn free(_: &str) -> Result<bool, Infallible> {
            Ok(false)
        }

        #[test]
        fn test_base_slug_basic() {
            assert_eq!(base_slug("Hello World"), "hello-world");
        }

        #[test]
        fn test_base_slug_special_characters() {
            assert_eq!(base_slug("Hello, World!"), "hello-world");
        }

        #[test]
        fn test_base_slug_diacritics() {
            assert_eq!(base_slug("Café au lait"), "cafe-au-lait");
        }

        #[test]
        fn test_base_slug_cyrillic() {
            assert_eq!(base_slug("Привет, мир!"), "privet-mir");
        }

        #[test]
        fn test_base_slug_multiple_spaces_and_edges() {
            assert_eq!(base_slug("  Hello   World  "), "hello-world");
            assert_eq!(base_slug("--Hello--World--"), "hello-world");
        }

        #[test]
        fn test_base_slug_empty_inputs() {
            assert_eq!(base_slug(""), "");
            assert_eq!(base_slug("   \t "), "");
            assert_eq!(base_slug("!!! ??? ..."), "");
        }

        #[test]
        fn test_base_slug_truncates_long_titles() {
            let title = "word ".repeat(100);
            let slug = base_slug(&title);
            assert!(slug.len() <= 180);
            assert!(!slug.ends_with('-'));
            assert!(validate_slug(&slug));
        }

        #[test]
        fn test_generate_slug_returns_base_when_free() {
            let slug = generate_slug("Hello World", "post-1", free).unwrap();
            assert_eq!(slug, "hello-world");
        }

        #[test]
        fn test_generate_slug_probes_linearly() {
            let existing: HashSet<&str> = ["privet-mir"].into_iter().collect();
            let slug = generate_slug::<_, Infallible>("Привет, мир!", "post-1", |c| {
                Ok(existing.contains(c))
            })
            .unwrap();
            assert_eq!(slug, "privet-mir-1");

            let existing: HashSet<&str> =
                ["news", "news-1", "news-2"].into_iter().collect();
            let slug =
                generate_slug::<_, Infallible>("News", "post-1", |c| Ok(existing.contains(c)))
                    .unwrap();
            assert_eq!(slug, "news-3");
        }

        #[test]
        fn test_generate_slug_falls_back_to_placeholder() {
            let fallback = SlugScope::Post.placeholder_slug(42);
            assert_eq!(generate_slug("", &fallback, free).unwrap(), "post-42");
            assert_eq!(generate_slug("   ", &fallback, free).unwrap(), "post-42");
            assert_eq!(generate_slug("?!%", &fallback, free).unwrap(), "post-42");
        }

        #[test]
        fn test_generate_slug_placeholders_do_not_collide() {
            let first = generate_slug("", &SlugScope::Category.placeholder_slug(1), free).unwrap();
            let second =
                generate_slug("", &SlugScope::Category.placeholder_slug(2), free).unwrap();
            assert_eq!(first, "category-1");
            assert_eq!(second, "category-2");
        }

        #[test]
        fn test_generate_slug_is_always_url_safe() {
            let inputs = [
                "",
                " ",
                "Hello",
                "Привет, мир!",
                "Ünïcödé Straße",
                "基础教程",
                "***",
                "a/b?c=d&e#f",
                "Tab\tand\nnewline",
                "🎉 Party 🎉",
            ];
            for (i, input) in inputs.iter().enumerate() {
                let fallback = SlugScope::Post.placeholder_slug(i as i64 + 1);
                let slug = generate_slug(input, &fallback, free).unwrap();
                assert!(validate_slug(&slug), "{:?} produced invalid slug {:?}", input, slug);
            }
        }

        #[test]
        fn test_generate_slug_unique_against_taken_set() {
            let mut taken: HashSet<String> = HashSet::new();
            for _ in 0..5 {
                let slug = generate_slug::<_, Infallible>("Same Title", "post-1", |c| {
                    Ok(taken.contains(c))
                })
                .unwrap();
                assert!(taken.insert(slug));
            }
            assert!(taken.contains("same-title"));
            assert!(taken.contains("same-title-4"));
        }

        #[test]
        fn test_assign_slug_retries_on_write_collision() {
            let mut stored = vec!["hello".to_string(), "hello-1".to_string()];
            let (slug, ()) = assign_slug(
                "Hello",
                "post-1",
                5,
                |_| Ok(false),
                |candidate| {
                    if stored.iter().any(|s| s == candidate) {
                        Err(SlugError::UniqueConstraintViolation {
                            slug: candidate.to_string(),
                        })
                    } else {
                        stored.push(candidate.to_string());
                        Ok(())
                    }
                },
            )
            .unwrap();
            assert_eq!(slug, "hello-2");
        }

        #[test]
        fn test_assign_slug_gives_up_after_max_attempts() {
            let result = assign_slug(
                "Hello",
                "post-1",
                3,
                |_| Ok(false),
                |candidate| -> Result<(), SlugError> {
                    Err(SlugError::UniqueConstraintViolation {
                        slug: candidate.to_string(),
                    })
                },
            );
            match result {
                Err(SlugError::SlugAssignmentFailed { base, attempts }) => {
                    assert_eq!(base, "hello");
                    assert_eq!(attempts, 3);
                }
                other => panic!("expected SlugAssignmentFailed, got {:?}", other),
            }
        }

        #[test]
        fn test_validate_slug_valid() {
            assert!(validate_slug("hello-world"));
            assert!(validate_slug("my-blog-post-2024"));
            assert!(validate_slug("a"));
            assert!(validate_slug("123"));
        }

        #[test]
        fn test_validate_slug_invalid() {
            assert!(!validate_slug(""));
            assert!(!validate_slug("Hello-World"));
            assert!(!validate_slug("hello_world"));
            assert!(!validate_slug("hello world"));
            assert!(!validate_slug("-hello"));
            assert!(!validate_slug("hello-"));
            assert!(!validate_slug("hello--world"));
        }

        #[test]
        fn test_validate_slug_length_limits() {
            assert!(validate_slug(&"a".repeat(200)));
            assert!(!validate_slug(&"a".repeat(201)));
        }

        #[test]
        fn test_needs_repair() {
            assert!(needs_repair(None));
            assert!(needs_repair(Some("")));
            assert!(needs_repair(Some("   ")));
            assert!(needs_repair(Some("Not A Slug")));
            assert!(!needs_repair(Some("fine-slug")));
        }
    }

    mod publication_tests {
        use crate::models::PublicationState;
        use crate::services::publication::Publication;
        use chrono::{DateTime, TimeZone, Utc};

        fn at(hour: u32) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
        }

        #[test]
        fn test_new_post_starts_as_draft() {
            let p = Publication::on_create(false, at(9));
            assert_eq!(p, Publication::draft());
            assert_eq!(p.state(), PublicationState::Draft);
            assert!(p.published_date.is_none());
        }

        #[test]
        fn test_create_published_stamps_date() {
            let p = Publication::on_create(true, at(9));
            assert_eq!(p.state(), PublicationState::Published);
            assert_eq!(p.published_date, Some(at(9).to_rfc3339()));
        }

        #[test]
        fn test_first_publish_sets_date() {
            let draft = Publication::draft();
            assert!(draft.stamps_on(true));
            let published = draft.apply(true, at(10));
            assert_eq!(published.published_date, Some(at(10).to_rfc3339()));
        }

        #[test]
        fn test_edit_while_published_keeps_date() {
            let published = Publication::draft().apply(true, at(10));
            let edited = published.apply(true, at(11));
            assert!(!published.stamps_on(true));
            assert_eq!(edited.published_date, Some(at(10).to_rfc3339()));
        }

        #[test]
        fn test_toggle_off_and_on_keeps_original_date() {
            let published = Publication::draft().apply(true, at(10));
            let unpublished = published.apply(false, at(11));
            assert!(!unpublished.is_published);
            assert_eq!(unpublished.published_date, Some(at(10).to_rfc3339()));
            assert_eq!(unpublished.state(), PublicationState::Draft);

            let republished = unpublished.apply(true, at(12));
            assert!(republished.is_published);
            assert_eq!(republished.published_date, Some(at(10).to_rfc3339()));
        }

        #[test]
        fn test_draft_edits_never_stamp() {
            let mut p = Publication::draft();
            for hour in 1..5 {
                p = p.apply(false, at(hour));
                assert!(p.published_date.is_none());
            }
        }

        #[test]
        fn test_publication_state_parse_and_display() {
            assert_eq!("draft".parse::<PublicationState>(), Ok(PublicationState::Draft));
            assert_eq!(
                "PUBLISHED".parse::<PublicationState>(),
                Ok(PublicationState::Published)
            );
            assert!("archived".parse::<PublicationState>().is_err());
            assert_eq!(PublicationState::Published.to_string(), "published");
        }
    }

    mod moderation_tests {
        use crate::models::Comment;
        use crate::services::comments::validate_comment;

        fn comment(approved: bool) -> Comment {
            Comment {
                id: 1,
                post_id: 1,
                author: "reader".to_string(),
                text: "Nice post".to_string(),
                created_date: "2024-03-01T10:00:00+00:00".to_string(),
                approved_comment: approved,
            }
        }

        #[test]
        fn test_only_approved_comments_are_visible() {
            assert!(!comment(false).is_visible());
            assert!(comment(true).is_visible());
        }

        #[test]
        fn test_validate_comment() {
            assert!(validate_comment("reader", "hello").is_ok());
            assert!(validate_comment("", "hello").is_err());
            assert!(validate_comment("reader", "   ").is_err());
            assert!(validate_comment(&"x".repeat(201), "hello").is_err());
        }
    }

    mod config_tests {
        use crate::Config;
        use std::path::Path;

        const MINIMAL: &str = r#"
[site]
title = "Test"

[database]
path = "./data/test.db"
"#;

        #[test]
        fn test_minimal_config_uses_defaults() {
            let config = Config::parse(MINIMAL).unwrap();
            assert_eq!(config.server.host, "127.0.0.1");
            assert_eq!(config.server.port, 3000);
            assert_eq!(config.database.pool_size, 10);
            assert_eq!(config.content.posts_per_page, 10);
            assert_eq!(config.content.slug_max_attempts, 5);
        }

        #[test]
        fn test_rejects_zero_slug_attempts() {
            let toml = format!("{}\n[content]\nslug_max_attempts = 0\n", MINIMAL);
            assert!(Config::parse(&toml).is_err());
        }

        #[test]
        fn test_rejects_oversized_page() {
            let toml = format!("{}\n[content]\nposts_per_page = 500\n", MINIMAL);
            assert!(Config::parse(&toml).is_err());
        }

        #[test]
        fn test_database_path_is_relative_to_config_dir() {
            let mut config = Config::parse(MINIMAL).unwrap();
            config.resolve_relative_to(Path::new("blog"));
            assert_eq!(
                Path::new(&config.database.path),
                Path::new("blog").join("./data/test.db")
            );
        }

        #[test]
        fn test_absolute_database_path_is_kept() {
            let toml = MINIMAL.replace("./data/test.db", "/srv/quill/blog.db");
            let mut config = Config::parse(&toml).unwrap();
            config.resolve_relative_to(Path::new("blog"));
            assert_eq!(config.database.path, "/srv/quill/blog.db");
        }

        #[test]
        fn test_bare_config_name_keeps_path() {
            let mut config = Config::parse(MINIMAL).unwrap();
            config.resolve_relative_to(Path::new(""));
            assert_eq!(config.database.path, "./data/test.db");
        }

        #[test]
        fn test_load_anchors_database_next_to_config() {
            use rand::Rng;
            let dir = std::env::temp_dir().join(format!("quill_cfg_{}", rand::thread_rng().gen::<u32>()));
            std::fs::create_dir_all(&dir).unwrap();
            let path = dir.join("quill.toml");
            std::fs::write(&path, MINIMAL).unwrap();

            let config = Config::load(&path).unwrap();
            assert_eq!(Path::new(&config.database.path), dir.join("./data/test.db"));

            std::fs::remove_dir_all(&dir).unwrap();
        }
    }

    mod web_error_tests {
        use crate::web::error::AppError;
        use axum::http::{header, StatusCode};
        use axum::response::IntoResponse;
        use r2d2::Pool;
        use r2d2_sqlite::SqliteConnectionManager;
        use std::time::Duration;

        fn exhausted_pool_error() -> r2d2::Error {
            let pool = Pool::builder()
                .max_size(1)
                .connection_timeout(Duration::from_millis(50))
                .build(SqliteConnectionManager::memory())
                .unwrap();
            let _held = pool.get().unwrap();
            match pool.get() {
                Ok(_) => panic!("pool of one handed out a second connection"),
                Err(e) => e,
            }
        }

        #[test]
        fn test_pool_exhaustion_is_service_unavailable() {
            let err = AppError::from(anyhow::Error::new(exhausted_pool_error()));
            assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);

            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
            assert!(response.headers().contains_key(header::RETRY_AFTER));
        }

        #[test]
        fn test_other_failures_are_internal_errors() {
            let err = AppError::from(anyhow::anyhow!("boom"));
            assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(
                err.into_response().status(),
                StatusCode::INTERNAL_SERVER_ERROR
            );
        }
    }
}
