use std::fs;
use std::path::PathBuf;

use casegen_core::{CaseField, Producer, SourceFormat};
use casegen_extract::output::{OutputFormat, format_report, format_table};
use casegen_extract::{DocumentLoader, ExtractError, Session, extract};
use casegen_templates::TemplateRegistry;

#[test]
fn test_checkout_text_fixture_yields_three_cases() {
    let document = DocumentLoader::default()
        .load(fixture("checkout.txt"))
        .expect("fixture should load");
    assert_eq!(document.format, SourceFormat::Text);

    let run = extract(&document);
    assert_eq!(run.report.producer, Producer::LineParser);
    assert!(!run.report.fallback_used);
    assert_eq!(run.cases.len(), 3);

    let first = &run.cases[0];
    assert_eq!(first.requirement, "Finalizar compra com cartão");
    assert_eq!(first.scenario, "pagamento aprovado");
    assert_eq!(
        first.given,
        "o carrinho possui dois itens e o cliente está autenticado"
    );
    assert_eq!(first.when, "confirma o pagamento com cartão válido");
    assert_eq!(first.then, "o pedido é criado com status \"Pago\"");

    // Requirement carries over to the second scenario.
    assert_eq!(run.cases[1].requirement, "Finalizar compra com cartão");
    assert_eq!(run.cases[1].scenario, "pagamento recusado");

    let third = &run.cases[2];
    assert_eq!(third.requirement, "Cupom de desconto");
    assert_eq!(third.given, "a coupon that expired yesterday");
    assert_eq!(third.then, "the total is unchanged");

    let lines = run.report.lines.as_ref().expect("line diagnostics");
    assert_eq!(lines.dropped_lines, 2);
    assert_eq!(lines.continuation_lines, 1);
}

#[test]
fn test_prose_fixture_falls_back_to_paragraphs() {
    let document = DocumentLoader::default()
        .load(fixture("notes.txt"))
        .expect("fixture should load");
    let run = extract(&document);

    assert_eq!(run.report.producer, Producer::Fallback);
    assert_eq!(run.cases.len(), 2);
    assert_eq!(run.cases[0].requirement, "Requirement 1");
    assert!(run.cases[0].scenario.starts_with("The billing module"));
    assert!(run.cases.iter().all(|case| case.is_complete()));
}

#[test]
fn test_json_fixture_finds_nested_cases() {
    let document = DocumentLoader::default()
        .load(fixture("suite.json"))
        .expect("fixture should load");
    let run = extract(&document);

    assert_eq!(run.report.producer, Producer::JsonTree);
    assert_eq!(run.cases.len(), 3);

    let login = &run.cases[0];
    assert_eq!(login.requirement, "Autenticação");
    assert_eq!(login.scenario, "login com senha válida");
    assert_eq!(login.when, "informa e-mail e senha");

    assert_eq!(run.cases[1].scenario, "senha incorreta");
    assert!(run.cases[1].given.is_empty());
    assert_eq!(run.cases[2].then, "lista de produtos ordenada por preço");
}

#[test]
fn test_xml_fixture_splits_sentences_into_steps() {
    let document = DocumentLoader::default()
        .load(fixture("suite.xml"))
        .expect("fixture should load");
    let run = extract(&document);

    assert_eq!(run.report.producer, Producer::XmlTree);
    assert_eq!(run.cases.len(), 2);

    let first = &run.cases[0];
    assert_eq!(first.scenario, "pagamento aprovado");
    assert_eq!(first.given, "Dado um carrinho com itens");
    assert_eq!(first.when, "Quando paga com cartão válido");
    assert_eq!(first.then, "Então o pedido é criado");

    let second = &run.cases[1];
    assert_eq!(second.requirement, "Entrega");
    assert_eq!(second.scenario, "frete grátis");
    assert_eq!(second.then, "Then shipping costs nothing");
}

#[test]
fn test_corrupt_json_is_extraction_failure() {
    let err = DocumentLoader::default()
        .load(fixture("broken.json"))
        .unwrap_err();
    match err {
        ExtractError::ExtractionFailure { path, .. } => assert!(path.ends_with("broken.json")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_latin1_text_is_decoded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.txt");
    fs::write(&path, b"Cen\xe1rio: caf\xe9\nEnt\xe3o servido").unwrap();

    let run = extract(&DocumentLoader::default().load(&path).unwrap());
    assert_eq!(run.cases[0].scenario, "café");
    assert_eq!(run.cases[0].then, "servido");
}

#[test]
fn test_session_round_trip_over_fixture() {
    let mut session = Session::new(TemplateRegistry::with_builtins());
    session.load_path(fixture("checkout.txt")).unwrap();
    session.preview().unwrap();

    session.select_template("teste_detalhado").unwrap();
    assert!(session.apply_edit(2, 5, "o total permanece igual").unwrap());
    assert_eq!(
        session.working_set()[2].get(CaseField::Then),
        "o total permanece igual"
    );

    let table = session.export().unwrap();
    assert_eq!(table.header.len(), 7);
    assert_eq!(table.rows[0][0], "");
    assert_eq!(table.rows[2][5], "o total permanece igual");

    let csv = format_table(&table, OutputFormat::Csv).unwrap();
    assert!(csv.starts_with("ID,Requisito,Cenário,Pré-condições,Passos,Resultado Esperado,Prioridade\n"));
    assert_eq!(csv.lines().count(), 4);

    let report = session.analyze().unwrap();
    assert_eq!(report.metrics.total_cases, 3);
    assert_eq!(report.metrics.complete_cases, 3);
}

#[test]
fn test_report_json_names_producer() {
    let run = extract(
        &DocumentLoader::default()
            .load(fixture("suite.xml"))
            .unwrap(),
    );
    let json = format_report(&run.report, OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["producer"], "xml-tree");
    assert_eq!(value["case_count"], 2);
    assert!(value["source"].as_str().unwrap().ends_with("suite.xml"));
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}
