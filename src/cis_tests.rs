// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the CIS API client, using wiremock to stand in for IAM and CIS.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::cis::CisConnector;
    use crate::errors::ProviderError;
    use crate::provider::{DnsProvider, NewDnsRecord, ProviderConnector};

    async fn mount_iam(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/identity/token"))
            .and(body_string_contains("apikey=test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "iam-token",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .mount(server)
            .await;
    }

    async fn connect(server: &MockServer) -> Box<dyn DnsProvider> {
        let connector = CisConnector::new(
            &server.uri(),
            &format!("{}/identity/token", server.uri()),
            Duration::from_secs(5),
        )
        .unwrap();
        connector.connect("test-key").await.unwrap()
    }

    #[tokio::test]
    async fn test_connect_rejected_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/identity/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid apikey"))
            .mount(&server)
            .await;

        let connector = CisConnector::new(
            &server.uri(),
            &format!("{}/identity/token", server.uri()),
            Duration::from_secs(5),
        )
        .unwrap();
        let result = connector.connect("bad-key").await;

        assert!(matches!(result, Err(ProviderError::Authentication(_))));
    }

    #[test]
    fn test_connector_rejects_invalid_endpoint() {
        let result = CisConnector::new("not a url", "https://iam.example", Duration::from_secs(5));
        assert!(matches!(result, Err(ProviderError::InvalidEndpoint(_))));
    }

    #[tokio::test]
    async fn test_list_zones_follows_pagination() {
        let server = MockServer::start().await;
        mount_iam(&server).await;

        Mock::given(method("GET"))
            .and(path("/v1/crn:1/zones"))
            .and(query_param("page", "1"))
            .and(header("X-Auth-User-Token", "Bearer iam-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "errors": [],
                "result": [{"id": "z1", "name": "example.com", "status": "active"}],
                "result_info": {"page": 1, "per_page": 1, "total_pages": 2, "count": 1}
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/crn:1/zones"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "errors": [],
                "result": [{"id": "z2", "name": "example.org"}],
                "result_info": {"page": 2, "per_page": 1, "total_pages": 2, "count": 1}
            })))
            .mount(&server)
            .await;

        let client = connect(&server).await;
        let zones = client.list_zones("crn:1").await.unwrap();

        let names: Vec<&str> = zones.iter().map(|z| z.name.as_str()).collect();
        assert_eq!(names, vec!["example.com", "example.org"]);
    }

    #[tokio::test]
    async fn test_list_zones_escapes_crn_slashes() {
        let server = MockServer::start().await;
        mount_iam(&server).await;

        Mock::given(method("GET"))
            .and(path("/v1/crn:v1:a%2Fabc::/zones"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "errors": [],
                "result": [],
                "result_info": {"page": 1, "total_pages": 1}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = connect(&server).await;
        let zones = client.list_zones("crn:v1:a/abc::").await.unwrap();

        assert!(zones.is_empty());
    }

    #[tokio::test]
    async fn test_list_zones_http_error() {
        let server = MockServer::start().await;
        mount_iam(&server).await;

        Mock::given(method("GET"))
            .and(path("/v1/crn:1/zones"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let client = connect(&server).await;
        let result = client.list_zones("crn:1").await;

        assert!(matches!(
            result,
            Err(ProviderError::Http { status: 403, .. })
        ));
    }

    #[tokio::test]
    async fn test_unsuccessful_envelope_is_api_error() {
        let server = MockServer::start().await;
        mount_iam(&server).await;

        Mock::given(method("GET"))
            .and(path("/v1/crn:1/zones"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "errors": [{"code": 10000, "message": "Authentication error"}],
                "result": null
            })))
            .mount(&server)
            .await;

        let client = connect(&server).await;
        let result = client.list_zones("crn:1").await;

        match result {
            Err(ProviderError::Api { code, message }) => {
                assert_eq!(code, 10000);
                assert_eq!(message, "Authentication error");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_records_filters_txt() {
        let server = MockServer::start().await;
        mount_iam(&server).await;

        Mock::given(method("GET"))
            .and(path("/v1/crn:1/zones/z1/dns_records"))
            .and(query_param("type", "TXT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "errors": [],
                "result": [{
                    "id": "r1",
                    "type": "TXT",
                    "name": "_acme-challenge.example.com",
                    "content": "key-1",
                    "ttl": 1,
                    "proxied": false
                }],
                "result_info": {"page": 1, "total_pages": 1}
            })))
            .mount(&server)
            .await;

        let client = connect(&server).await;
        let records = client.list_records("crn:1", "z1").await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "r1");
        assert_eq!(records[0].record_type, "TXT");
        assert_eq!(records[0].content, "key-1");
        assert_eq!(records[0].ttl, Some(1));
    }

    #[tokio::test]
    async fn test_create_record_posts_txt_body() {
        let server = MockServer::start().await;
        mount_iam(&server).await;

        Mock::given(method("POST"))
            .and(path("/v1/crn:1/zones/z1/dns_records"))
            .and(body_json(json!({
                "type": "TXT",
                "name": "_acme-challenge.example.com.",
                "content": "key-1"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "errors": [],
                "result": {
                    "id": "r9",
                    "type": "TXT",
                    "name": "_acme-challenge.example.com",
                    "content": "key-1",
                    "ttl": 1
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = connect(&server).await;
        let record = NewDnsRecord {
            record_type: "TXT".to_string(),
            name: "_acme-challenge.example.com.".to_string(),
            content: "key-1".to_string(),
        };
        let created = client.create_record("crn:1", "z1", &record).await.unwrap();

        assert_eq!(created.id, "r9");
    }

    #[tokio::test]
    async fn test_delete_record() {
        let server = MockServer::start().await;
        mount_iam(&server).await;

        Mock::given(method("DELETE"))
            .and(path("/v1/crn:1/zones/z1/dns_records/r9"))
            .and(header("X-Auth-User-Token", "Bearer iam-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "errors": [],
                "result": {"id": "r9"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = connect(&server).await;
        client.delete_record("crn:1", "z1", "r9").await.unwrap();
    }
}
