use std::fs;
use std::path::PathBuf;

use tempfile::tempdir;
use topogen::config_loader::{build_topology, load_config};
use topogen::gml_parser::read_gml_topology;
use topogen::topology::netconfig::{get_capacities, get_delays, set_delays_constant};
use topogen::topology::nodeconfig::{get_application_names, get_application_properties, get_stack};
use topogen::topology::{NodeId, PropertyValue};
use topogen::utils::units::DelayUnit;
use topogen::utils::validation::{validate_link_units, validate_topology};
use topogen::xml::{read_topology, write_topology, XmlError};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

#[test]
fn test_read_example_topology() {
    let topology = read_topology(&fixture("example_topology.xml")).unwrap();

    assert!(!topology.is_directed());
    assert_eq!(topology.name(), Some("example"));
    assert_eq!(topology.node_count(), 3);
    assert_eq!(topology.edge_count(), 2);
    assert_eq!(topology.properties.get("delay_unit"), Some(&PropertyValue::from("ms")));
    assert_eq!(topology.properties.get("capacity_unit"), Some(&PropertyValue::from("Mbps")));

    let client = NodeId::Int(0);
    assert_eq!(get_stack(&topology, &client).unwrap().unwrap().name, "tcp");
    assert_eq!(get_application_names(&topology, &client).unwrap(), vec!["ns3::UdpEchoClient"]);
    let props = get_application_properties(&topology, &client, "ns3::UdpEchoClient")
        .unwrap()
        .unwrap();
    assert_eq!(props.get("RemoteAddress"), Some(&PropertyValue::from("10.0.0.2")));
    assert_eq!(props.get("RemotePort"), Some(&PropertyValue::Int(9)));
    assert_eq!(props.get("Interval"), Some(&PropertyValue::Float(0.5)));

    let delays = get_delays(&topology);
    assert_eq!(delays[&(NodeId::Int(0), NodeId::Int(1))], 2.0);
    assert_eq!(delays[&(NodeId::Int(1), NodeId::Int(2))], 7.5);
    assert_eq!(get_capacities(&topology)[&(NodeId::Int(0), NodeId::Int(1))], 100.0);

    assert!(validate_topology(&topology).is_ok());
    assert!(validate_link_units(&topology).is_ok());
}

#[test]
fn test_written_topology_reads_back_equal() {
    let mut topology = read_topology(&fixture("example_topology.xml")).unwrap();
    set_delays_constant(&mut topology, 500.0, DelayUnit::Us, None).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("out.xml");
    write_topology(&topology, &path).unwrap();

    let reread = read_topology(&path).unwrap();
    assert_eq!(reread, topology);
    // the unit stays ms, the value is converted
    assert_eq!(get_delays(&reread)[&(NodeId::Int(0), NodeId::Int(1))], 0.5);
}

#[test]
fn test_syntax_error_reports_line() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.xml");
    fs::write(&path, "<topology>\n  <node id=\"0\">\n</topology>\n").unwrap();

    match read_topology(&path) {
        Err(XmlError::Syntax { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected a syntax error, got {:?}", other),
    }
}

#[test]
fn test_link_to_undeclared_node_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dangling.xml");
    fs::write(&path, r#"<topology><node id="0"/><link from="0" to="5"/></topology>"#).unwrap();

    assert!(matches!(read_topology(&path), Err(XmlError::Schema { .. })));
}

#[test]
fn test_missing_file() {
    assert!(matches!(
        read_topology(&fixture("does_not_exist.xml")),
        Err(XmlError::Io { .. })
    ));
}

#[test]
fn test_build_scenario_fixture() {
    let config = load_config(&fixture("scenario.yaml")).unwrap();
    assert_eq!(config.output.as_deref(), Some("dumbbell.xml"));

    let topology = build_topology(&config).unwrap();
    assert_eq!(topology.node_count(), 5);
    assert_eq!(topology.edge_count(), 4);
    assert_eq!(topology.properties.get("capacity_unit"), Some(&PropertyValue::from("Gbps")));
    assert_eq!(
        get_application_names(&topology, &NodeId::Int(4)).unwrap(),
        vec!["ns3::PacketSink"]
    );

    let dir = tempdir().unwrap();
    let path = dir.path().join("dumbbell.xml");
    write_topology(&topology, &path).unwrap();
    assert_eq!(read_topology(&path).unwrap(), topology);
}

#[test]
fn test_gml_import_to_xml() {
    let dir = tempdir().unwrap();
    let gml = dir.path().join("graph.gml");
    fs::write(
        &gml,
        r#"graph [
  directed 0
  node [ id 0 label "a" ]
  node [ id 1 label "b" ]
  node [ id 2 label "c" ]
  edge [ source 0 target 1 weight 1.5 ]
  edge [ source 1 target 2 ]
]"#,
    )
    .unwrap();

    let topology = read_gml_topology(&gml).unwrap();
    assert_eq!(topology.edge_count(), 2);
    assert_eq!(
        topology.node(&NodeId::Int(1)).unwrap().get("label"),
        Some(&PropertyValue::from("b"))
    );

    let xml = dir.path().join("graph.xml");
    write_topology(&topology, &xml).unwrap();
    let reread = read_topology(&xml).unwrap();
    assert_eq!(reread, topology);
    assert_eq!(
        reread.edge(&NodeId::Int(0), &NodeId::Int(1)).unwrap().get("weight"),
        Some(&PropertyValue::Float(1.5))
    );
}
