//! Tests for `ReqwestTransport`.

use std::time::Duration;

use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::reqwest_transport::{append_query, header_pairs, parse_body, positive_timeout};
use super::{
    RequestMethod, ReqwestTransport, TIMEOUT_ERROR_CODE, Transport, TransportError,
    TransportRequest,
};
use crate::params::{Headers, ParamValue, Params, to_headers, to_params};

fn request(method: RequestMethod, url: impl Into<String>) -> TransportRequest {
    TransportRequest {
        method,
        url: url.into(),
        params: Params::new(),
        data: None,
        headers: Headers::new(),
        timeout: None,
        signal: CancellationToken::new(),
    }
}

fn transport_for(server: &MockServer) -> ReqwestTransport {
    ReqwestTransport::new().with_base_url(Url::parse(&server.uri()).unwrap())
}

mod construction {
    use super::*;

    #[test]
    fn new_has_no_base_url() {
        let transport = ReqwestTransport::new();

        assert!(transport.base_url().is_none());
        assert!(format!("{transport:?}").contains("ReqwestTransport"));
    }

    #[test]
    fn default_matches_new() {
        assert!(ReqwestTransport::default().base_url().is_none());
    }

    #[test]
    fn from_client_accepts_custom_client() {
        let custom = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap();

        let transport = ReqwestTransport::from_client(custom);

        let _ = format!("{transport:?}");
    }

    #[test]
    fn transport_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReqwestTransport>();
    }
}

mod url_resolution {
    use super::*;

    fn with_base(base: &str) -> ReqwestTransport {
        ReqwestTransport::new().with_base_url(Url::parse(base).unwrap())
    }

    #[test]
    fn absolute_urls_pass_through() {
        let transport = with_base("https://api.example.com");

        let url = transport.resolve_url("https://other.example.com/x").unwrap();

        assert_eq!(url.as_str(), "https://other.example.com/x");
    }

    #[test]
    fn relative_paths_join_with_single_slash() {
        for (base, path) in [
            ("https://api.example.com/v1", "/users/1"),
            ("https://api.example.com/v1/", "/users/1"),
            ("https://api.example.com/v1/", "users/1"),
            ("https://api.example.com/v1", "users/1"),
        ] {
            let url = with_base(base).resolve_url(path).unwrap();
            assert_eq!(url.as_str(), "https://api.example.com/v1/users/1");
        }
    }

    #[test]
    fn relative_path_without_base_is_rejected() {
        let err = ReqwestTransport::new().resolve_url("/users/1").unwrap_err();

        assert!(matches!(err, TransportError::Other(_)));
        assert!(err.to_string().contains("requires a base URL"));
    }
}

mod helpers {
    use super::*;

    #[test]
    fn append_query_skips_null_values() {
        let mut url = Url::parse("https://example.com/search").unwrap();
        let params = to_params([
            ("q", ParamValue::from("rust lang")),
            ("page", ParamValue::from(2)),
            ("skip", ParamValue::Null),
        ]);

        append_query(&mut url, &params);

        assert_eq!(url.query(), Some("page=2&q=rust+lang"));
    }

    #[test]
    fn append_query_leaves_url_untouched_when_empty() {
        let mut url = Url::parse("https://example.com/search").unwrap();

        append_query(&mut url, &to_params([("skip", ParamValue::Null)]));

        assert_eq!(url.as_str(), "https://example.com/search");
    }

    #[test]
    fn header_pairs_reject_invalid_names() {
        let err = header_pairs(&to_headers([("bad header", "x")])).unwrap_err();

        assert!(matches!(err, TransportError::Other(_)));
    }

    #[test]
    fn header_pairs_convert_valid_headers() {
        let pairs = header_pairs(&to_headers([("x-trace", "abc")])).unwrap();

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0.as_str(), "x-trace");
        assert_eq!(pairs[0].1, "abc");
    }

    #[test]
    fn positive_timeout_drops_zero_and_negative() {
        assert_eq!(positive_timeout(None), None);
        assert_eq!(positive_timeout(Some(0.0)), None);
        assert_eq!(positive_timeout(Some(-100.0)), None);
        assert_eq!(positive_timeout(Some(1500.0)), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn parse_body_prefers_json() {
        assert_eq!(parse_body(b""), Value::Null);
        assert_eq!(parse_body(br#"{"a":1}"#), json!({ "a": 1 }));
        assert_eq!(parse_body(b"plain text"), json!("plain text"));
    }
}

mod requests {
    use super::*;

    #[tokio::test]
    async fn sends_method_path_query_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/42"))
            .and(query_param("page", "2"))
            .and(query_param_is_missing("skip"))
            .and(header("x-trace", "abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 42 })))
            .expect(1)
            .mount(&server)
            .await;

        let mut req = request(RequestMethod::Get, "/users/42");
        req.params = to_params([("page", ParamValue::from(2)), ("skip", ParamValue::Null)]);
        req.headers = to_headers([("x-trace", "abc")]);

        let reply = transport_for(&server).request(req).await.unwrap();

        assert_eq!(reply.status, http::StatusCode::OK);
        assert_eq!(reply.data, json!({ "id": 42 }));
    }

    #[tokio::test]
    async fn sends_json_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users"))
            .and(body_json(json!({ "name": "alice" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1 })))
            .expect(1)
            .mount(&server)
            .await;

        let mut req = request(RequestMethod::Post, "/users");
        req.data = Some(json!({ "name": "alice" }).into());

        let reply = transport_for(&server).request(req).await.unwrap();

        assert_eq!(reply.status, http::StatusCode::CREATED);
    }

    #[tokio::test]
    async fn empty_reply_body_is_null() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let reply = transport_for(&server)
            .request(request(RequestMethod::Delete, "/users/1"))
            .await
            .unwrap();

        assert_eq!(reply.data, Value::Null);
    }

    #[tokio::test]
    async fn error_status_fails_with_reply_attached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
            .mount(&server)
            .await;

        let err = transport_for(&server)
            .request(request(RequestMethod::Get, "/missing"))
            .await
            .unwrap_err();

        let TransportError::Request {
            message,
            code,
            response,
        } = err
        else {
            panic!("expected request failure, got {err:?}");
        };
        assert_eq!(message, "Request failed with status code 404");
        assert_eq!(code, None);
        let response = response.expect("reply");
        assert_eq!(response.status, http::StatusCode::NOT_FOUND);
        assert_eq!(response.data, json!("not here"));
    }

    #[tokio::test]
    async fn slow_reply_times_out_with_timeout_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let mut req = request(RequestMethod::Get, "/slow");
        req.timeout = Some(50.0);

        let err = transport_for(&server).request(req).await.unwrap_err();

        let TransportError::Request { message, code, .. } = err else {
            panic!("expected request failure, got {err:?}");
        };
        assert_eq!(code.as_deref(), Some(TIMEOUT_ERROR_CODE));
        assert_eq!(message, "timeout of 50ms exceeded");
    }

    #[tokio::test]
    async fn fired_signal_reports_cancellation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let req = request(RequestMethod::Get, "/slow");
        let signal = req.signal.clone();
        let transport = transport_for(&server);

        let pending = tokio::spawn(async move { transport.request(req).await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        signal.cancel();

        let err = pending.await.unwrap().unwrap_err();
        assert!(err.is_cancellation());
    }

    #[tokio::test]
    async fn relative_url_without_base_fails_before_sending() {
        let err = ReqwestTransport::new()
            .request(request(RequestMethod::Get, "/nowhere"))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Other(_)));
    }
}
