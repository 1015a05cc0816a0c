//! Réponses Subsonic factices partagées par les tests d'intégration

#![allow(dead_code)]

use pmosubsonic::{ServerConfig, SubsonicClient};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "sesame";

/// Enveloppe une réponse XML `ok`
pub fn ok_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<subsonic-response xmlns="http://subsonic.org/restapi" status="ok" version="1.16.1">{}</subsonic-response>"#,
        body
    )
}

/// Réponse `failed` avec un élément `<error>`
pub fn failed_xml(code: u32, message: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<subsonic-response xmlns="http://subsonic.org/restapi" status="failed" version="1.16.1"><error code="{}" message="{}"/></subsonic-response>"#,
        code, message
    )
}

pub fn xml_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/xml; charset=utf-8")
}

pub fn endpoint(name: &str) -> String {
    format!("/rest/{}.view", name)
}

pub fn server_config(server: &MockServer) -> ServerConfig {
    ServerConfig::new(server.uri(), USERNAME, PASSWORD)
}

pub fn client(server: &MockServer) -> SubsonicClient {
    SubsonicClient::new(server_config(server)).unwrap()
}

/// Monte `getAlbum?id=<id>` avec les pistes données
pub async fn mount_album(server: &MockServer, id: &str, songs: &[&str]) {
    let entries: String = songs
        .iter()
        .map(|s| format!(r#"<song id="{}" title="Title {}" suffix="mp3"/>"#, s, s))
        .collect();
    Mock::given(method("GET"))
        .and(path(endpoint("getAlbum")))
        .and(query_param("id", id))
        .respond_with(xml_response(ok_xml(&format!(
            r#"<album id="{}" name="Album {}" songCount="{}">{}</album>"#,
            id,
            id,
            songs.len(),
            entries
        ))))
        .mount(server)
        .await;
}
