use oasdoc_core::document::{APPLICATION_JSON, TEXT_PLAIN};
use oasdoc_core::{
    check_document, Contact, Extensible, HttpMethod, Info, License, OpenApi, Operation, Parameter,
    PathItem, Paths, RequestBody, ResponseObject, ResponsesObject, RouteSpec, Tag, ToDict,
    TypeSpec,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn ok(description: &str) -> ResponsesObject {
    ResponsesObject::new().with_response("200", ResponseObject::new(description))
}

#[test]
fn test_end_to_end_minimal_document() {
    let info = Info::new("Test", "1.2.2").with_contact(Contact::new().with_email("a@b.com"));
    let api = OpenApi::new(info, Paths::new());

    let dict = api.to_dict();
    assert_eq!(dict["info"]["contact"]["email"], json!("a@b.com"));
    assert_eq!(dict["openapi"], json!("3.0.2"));

    let parsed = api.check().unwrap();
    assert_eq!(parsed.info.title, "Test");
}

#[test]
fn test_metadata_uses_camel_case_keys() {
    let info = Info::new("Pets", "1.0")
        .with_terms_of_service("https://example.com/tos")
        .with_license(
            License::new("Apache-2.0")
                .with_url("https://www.apache.org/licenses/LICENSE-2.0")
                .unwrap(),
        );
    assert_eq!(
        info.to_value(),
        json!({
            "title": "Pets",
            "version": "1.0",
            "termsOfService": "https://example.com/tos",
            "license": {"name": "Apache-2.0", "url": "https://www.apache.org/licenses/LICENSE-2.0"}
        })
    );
    assert!(Contact::new().with_url("not-a-url").is_err());
}

#[test]
fn test_paths_merge_regardless_of_order() {
    init_tracing();
    let get = || PathItem::new().with_operation(Operation::get(ok("list")));
    let post = || PathItem::new().with_operation(Operation::post(ok("created")));

    let mut forward = Paths::new();
    forward.add("/x", get());
    forward.add("/x", post());

    let mut backward = Paths::new();
    backward.add("/x", post());
    backward.add("/x", get());

    let item = forward.get("/x").unwrap();
    assert_eq!(item.methods(), vec![HttpMethod::Get, HttpMethod::Post]);
    assert_eq!(forward.to_value(), backward.to_value());
}

#[test]
fn test_same_path_same_method_extra_parameter() {
    let mut paths = Paths::new();
    paths.add(
        "/pets/{id}",
        PathItem::new()
            .with_parameter(Parameter::path("id"))
            .with_operation(Operation::get(ok("first"))),
    );
    paths.add(
        "/pets/{id}",
        PathItem::new()
            .with_parameter(Parameter::path("id").with_description("Pet id"))
            .with_parameter(Parameter::query("fields"))
            .with_operation(Operation::get(ok("second"))),
    );
    let item = paths.get("/pets/{id}").unwrap();
    assert_eq!(item.parameters.len(), 2);
    assert_eq!(item.parameters[0].description.as_deref(), Some("Pet id"));
    assert_eq!(
        item.operation(HttpMethod::Get).unwrap().responses,
        ok("first")
    );
}

#[test]
fn test_boolean_false_is_serialized() {
    let parameter = Parameter::query("limit").with_required(false);
    assert_eq!(parameter.to_dict()["required"], json!(false));
}

#[test]
fn test_extensions_sit_next_to_standard_fields() {
    let mut operation = Operation::get(ok("ok")).with_operation_id("listPets");
    assert!(operation.add_extension("not-x-prefixed", 1).is_err());
    operation.add_extension("x-custom", 1).unwrap();
    let dict = operation.to_dict();
    assert_eq!(dict["x-custom"], json!(1));
    assert_eq!(dict["operationId"], json!("listPets"));
}

#[test]
fn test_full_document_round_trips_through_yaml() {
    init_tracing();
    let mut api = OpenApi::new(Info::new("Pets", "1.0.0"), Paths::new())
        .with_tag(Tag::new("pets").external_doc("https://example.com/pets", None).unwrap());

    let body = RequestBody::of(api.factory_mut(), TEXT_PLAIN, TypeSpec::of::<String>())
        .unwrap()
        .with_required(true);
    let created = ResponseObject::of(
        api.factory_mut(),
        "Created ids",
        APPLICATION_JSON,
        TypeSpec::of::<Vec<i64>>(),
    )
    .unwrap();
    let operation = Operation::post(ResponsesObject::new().with_response("201", created))
        .with_tag("pets")
        .with_request_body(body);
    api.add_path("/pets", PathItem::new().with_operation(operation));

    let json_text = api.to_json().unwrap();
    let yaml_text = api.to_yaml().unwrap();
    let from_json: Value = serde_json::from_str(&json_text).unwrap();
    let from_yaml: Value = serde_yaml::from_str(&yaml_text).unwrap();
    assert_eq!(from_json, from_yaml);
    assert_eq!(
        from_json["paths"]["/pets"]["post"]["requestBody"],
        json!({"content": {"text/plain": {"schema": {"type": "string"}}}, "required": true})
    );
    check_document(&from_json).unwrap();
}

#[test]
fn test_routes_build_the_document() {
    let mut api = OpenApi::new(Info::new("Pets", "1.0.0"), Paths::new());
    let options = RouteSpec::new("/pets/<int:pet_id>")
        .with_methods(["GET", "DELETE"])
        .with_responses(ok("done"))
        .with_tag_names(["pets"])
        .register_on(&mut api)
        .unwrap();
    assert_eq!(options.methods, vec!["GET", "DELETE"]);

    let dict = api.to_dict();
    let item = &dict["paths"]["/pets/{pet_id}"];
    assert_eq!(item["delete"]["tags"], json!(["pets"]));
    assert_eq!(item["parameters"][0]["schema"], json!({"type": "integer", "format": "int32"}));
    assert_eq!(dict["tags"], json!([{"name": "pets"}]));
}
