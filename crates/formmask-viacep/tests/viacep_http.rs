//! HTTP tests for the ViaCEP lookup.
//!
//! Each test starts a wiremock server standing in for viacep.com.br and
//! checks how one response maps onto a `LookupResponse` or an error.

use formmask_core::traits::{AddressLookup, LookupResponse};
use formmask_core::{Cep, Error};
use formmask_viacep::ViaCepLookup;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cep() -> Cep {
    Cep::parse("01001000").unwrap()
}

async fn mount_json(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/ws/01001000/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn found_address_is_mapped() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        serde_json::json!({
            "cep": "01001-000",
            "logradouro": "Praça da Sé",
            "complemento": "lado ímpar",
            "bairro": "Sé",
            "localidade": "São Paulo",
            "uf": "SP",
            "ibge": "3550308",
            "ddd": "11"
        }),
    )
    .await;

    let lookup = ViaCepLookup::new(server.uri(), None).unwrap();
    let response = lookup.lookup(&cep()).await.unwrap();

    let LookupResponse::Found(address) = response else {
        panic!("expected Found, got {:?}", response);
    };
    assert_eq!(address.postal_code, "01001-000");
    assert_eq!(address.street, "Praça da Sé");
    assert_eq!(address.neighborhood, "Sé");
    assert_eq!(address.city, "São Paulo");
    assert_eq!(address.state, "SP");
}

#[tokio::test]
async fn erro_true_is_not_found() {
    let server = MockServer::start().await;
    mount_json(&server, serde_json::json!({ "erro": true })).await;

    let lookup = ViaCepLookup::new(server.uri(), None).unwrap();
    assert_eq!(
        lookup.lookup(&cep()).await.unwrap(),
        LookupResponse::NotFound
    );
}

#[tokio::test]
async fn erro_as_string_is_not_found() {
    let server = MockServer::start().await;
    mount_json(&server, serde_json::json!({ "erro": "true" })).await;

    let lookup = ViaCepLookup::new(server.uri(), None).unwrap();
    assert_eq!(
        lookup.lookup(&cep()).await.unwrap(),
        LookupResponse::NotFound
    );
}

#[tokio::test]
async fn server_error_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let lookup = ViaCepLookup::new(server.uri(), None).unwrap();
    let err = lookup.lookup(&cep()).await.unwrap_err();

    match err {
        Error::Service { service, message } => {
            assert_eq!(service, "viacep");
            assert!(message.contains("503"), "message: {}", message);
        }
        other => panic!("expected Service error, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_body_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let lookup = ViaCepLookup::new(server.uri(), None).unwrap();
    let err = lookup.lookup(&cep()).await.unwrap_err();
    assert!(matches!(err, Error::Json(_)), "{:?}", err);
}

#[tokio::test]
async fn unreachable_service_is_an_error() {
    // Port 1 is closed on test hosts
    let lookup = ViaCepLookup::new("http://127.0.0.1:1", None).unwrap();
    let err = lookup.lookup(&cep()).await.unwrap_err();
    assert!(matches!(err, Error::Http(_)), "{:?}", err);
}

#[tokio::test]
async fn configured_timeout_applies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "erro": true }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let lookup = ViaCepLookup::new(server.uri(), Some(Duration::from_millis(50))).unwrap();
    let err = lookup.lookup(&cep()).await.unwrap_err();
    assert!(matches!(err, Error::Http(_)), "{:?}", err);
}
