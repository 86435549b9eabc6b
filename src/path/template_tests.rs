//! Tests for `PathTemplate`.

use super::{PathError, PathTemplate};
use crate::params::{ParamValue, Params, to_params};

fn render(template: &str, params: &Params) -> Result<String, PathError> {
    PathTemplate::compile(template).render(params)
}

mod parsing {
    use super::*;

    #[test]
    fn collects_param_names_in_order() {
        let template = PathTemplate::compile("/user/:userId/comments/:comment_id");
        let names: Vec<_> = template.param_names().collect();

        assert_eq!(names, ["userId", "comment_id"]);
    }

    #[test]
    fn template_without_placeholders_has_no_params() {
        let template = PathTemplate::compile("/health/live");
        assert_eq!(template.param_names().count(), 0);
    }

    #[test]
    fn lone_colon_is_literal() {
        let template = PathTemplate::compile("https://api.example.com/:id");
        let names: Vec<_> = template.param_names().collect();

        assert_eq!(names, ["id"]);
    }

    #[test]
    fn escaped_colon_is_literal() {
        let template = PathTemplate::compile("http://localhost\\:8080/:id");
        let names: Vec<_> = template.param_names().collect();

        assert_eq!(names, ["id"]);
        assert_eq!(
            template.render(&to_params([("id", 1)])).unwrap(),
            "http://localhost:8080/1"
        );
    }

    #[test]
    fn display_shows_source() {
        let template = PathTemplate::compile("/a/:b");
        assert_eq!(template.to_string(), "/a/:b");
        assert_eq!(template.source(), "/a/:b");
    }
}

mod rendering {
    use super::*;

    #[test]
    fn substitutes_string_value() {
        let path = render("/hello/:name", &to_params([("name", "foo")])).unwrap();
        assert_eq!(path, "/hello/foo");
    }

    #[test]
    fn substitution_matches_manual_interpolation() {
        for value in ["foo", "bar", "baz", "a-b_c.d"] {
            let path = render("/items/:x/details", &to_params([("x", value)])).unwrap();
            assert_eq!(path, format!("/items/{value}/details"));
        }
    }

    #[test]
    fn substitutes_numbers() {
        let path = render("/user/:id", &to_params([("id", 42)])).unwrap();
        assert_eq!(path, "/user/42");

        let path = render("/ratio/:r", &to_params([("r", 0.25)])).unwrap();
        assert_eq!(path, "/ratio/0.25");
    }

    #[test]
    fn substitutes_multiple_placeholders() {
        let params = to_params([("org", ParamValue::from("acme")), ("repo", 7.into())]);
        let path = render("/:org/repos/:repo", &params).unwrap();

        assert_eq!(path, "/acme/repos/7");
    }

    #[test]
    fn ignores_extra_params() {
        let params = to_params([("id", "1"), ("unused", "2")]);
        assert_eq!(render("/user/:id", &params).unwrap(), "/user/1");
    }

    #[test]
    fn optional_placeholder_present() {
        let path = render("/posts/:page?", &to_params([("page", 3)])).unwrap();
        assert_eq!(path, "/posts/3");
    }

    #[test]
    fn optional_placeholder_missing_drops_prefix() {
        let path = render("/posts/:page?", &Params::new()).unwrap();
        assert_eq!(path, "/posts");
    }

    #[test]
    fn optional_placeholder_null_drops_prefix() {
        let params = to_params([("page", ParamValue::Null)]);
        assert_eq!(render("/posts/:page?/all", &params).unwrap(), "/posts/all");
    }
}

mod errors {
    use super::*;

    #[test]
    fn missing_required_param() {
        let err = render("/foo/:bar", &Params::new()).unwrap_err();

        assert_eq!(
            err,
            PathError::MissingParam {
                name: "bar".to_owned()
            }
        );
        assert_eq!(err.to_string(), "Expected \"bar\" to be defined");
    }

    #[test]
    fn null_required_param() {
        let err = render("/foo/:bar", &to_params([("bar", ParamValue::Null)])).unwrap_err();

        assert!(matches!(err, PathError::InvalidParam { ref name, .. } if name == "bar"));
    }

    #[test]
    fn empty_value_is_rejected() {
        let err = render("/foo/:bar", &to_params([("bar", "")])).unwrap_err();
        assert_eq!(err.name(), "bar");
    }

    #[test]
    fn value_with_separator_is_rejected() {
        for bad in ["a/b", "a?b", "a#b"] {
            let err = render("/foo/:bar", &to_params([("bar", bad)])).unwrap_err();
            assert!(
                matches!(err, PathError::InvalidParam { .. }),
                "expected {bad:?} to be rejected"
            );
        }
    }
}
