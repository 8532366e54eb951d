//! Protocol stack and application assignment on nodes.

use crate::topology::types::{Application, Node, NodeId, Properties, Stack, Topology, TopologyError};

fn node_mut<'a>(topology: &'a mut Topology, node: &NodeId) -> Result<&'a mut Node, TopologyError> {
    topology
        .node_mut(node)
        .ok_or_else(|| TopologyError::NodeNotFound(node.clone()))
}

/// Install a protocol stack on a node, replacing any previous one
pub fn add_stack(
    topology: &mut Topology,
    node: &NodeId,
    name: &str,
    properties: Properties,
) -> Result<(), TopologyError> {
    node_mut(topology, node)?.stack = Some(Stack {
        name: name.to_string(),
        properties,
    });
    Ok(())
}

/// Attach an application to a node
///
/// An application with the same name already on the node is replaced in
/// place.
pub fn add_application(
    topology: &mut Topology,
    node: &NodeId,
    name: &str,
    properties: Properties,
) -> Result<(), TopologyError> {
    let node = node_mut(topology, node)?;
    let application = Application {
        name: name.to_string(),
        properties,
    };
    match node.applications.iter_mut().find(|a| a.name == name) {
        Some(existing) => *existing = application,
        None => node.applications.push(application),
    }
    Ok(())
}

/// Remove the named application, or all of them when `name` is `None`
pub fn remove_application(
    topology: &mut Topology,
    node: &NodeId,
    name: Option<&str>,
) -> Result<(), TopologyError> {
    let node = node_mut(topology, node)?;
    match name {
        Some(name) => node.applications.retain(|a| a.name != name),
        None => node.applications.clear(),
    }
    Ok(())
}

pub fn get_stack<'a>(topology: &'a Topology, node: &NodeId) -> Result<Option<&'a Stack>, TopologyError> {
    topology
        .node(node)
        .map(|n| n.stack.as_ref())
        .ok_or_else(|| TopologyError::NodeNotFound(node.clone()))
}

pub fn get_application_names<'a>(topology: &'a Topology, node: &NodeId) -> Result<Vec<&'a str>, TopologyError> {
    topology
        .node(node)
        .map(|n| n.applications.iter().map(|a| a.name.as_str()).collect())
        .ok_or_else(|| TopologyError::NodeNotFound(node.clone()))
}

pub fn get_application_properties<'a>(
    topology: &'a Topology,
    node: &NodeId,
    name: &str,
) -> Result<Option<&'a Properties>, TopologyError> {
    topology
        .node(node)
        .map(|n| n.applications.iter().find(|a| a.name == name).map(|a| &a.properties))
        .ok_or_else(|| TopologyError::NodeNotFound(node.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::models::line_topology;
    use crate::topology::types::PropertyValue;

    fn props(pairs: &[(&str, PropertyValue)]) -> Properties {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_add_and_replace_stack() {
        let mut topology = line_topology(2).unwrap();
        let node = NodeId::Int(0);
        add_stack(&mut topology, &node, "tcp", props(&[("mss", PropertyValue::Int(1460))])).unwrap();
        add_stack(&mut topology, &node, "udp", Properties::new()).unwrap();

        let stack = get_stack(&topology, &node).unwrap().unwrap();
        assert_eq!(stack.name, "udp");
        assert!(get_stack(&topology, &NodeId::Int(1)).unwrap().is_none());
    }

    #[test]
    fn test_applications() {
        let mut topology = line_topology(2).unwrap();
        let node = NodeId::Int(1);
        add_application(&mut topology, &node, "client", props(&[("Port", PropertyValue::Int(9))])).unwrap();
        add_application(&mut topology, &node, "server", Properties::new()).unwrap();
        add_application(&mut topology, &node, "client", props(&[("Port", PropertyValue::Int(10))])).unwrap();

        assert_eq!(get_application_names(&topology, &node).unwrap(), vec!["client", "server"]);
        let client = get_application_properties(&topology, &node, "client").unwrap().unwrap();
        assert_eq!(client.get("Port"), Some(&PropertyValue::Int(10)));

        remove_application(&mut topology, &node, Some("client")).unwrap();
        assert_eq!(get_application_names(&topology, &node).unwrap(), vec!["server"]);
        remove_application(&mut topology, &node, None).unwrap();
        assert!(get_application_names(&topology, &node).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_node() {
        let mut topology = line_topology(2).unwrap();
        let missing = NodeId::from("nowhere");
        assert!(matches!(
            add_application(&mut topology, &missing, "client", Properties::new()),
            Err(TopologyError::NodeNotFound(_))
        ));
        assert!(get_stack(&topology, &missing).is_err());
        assert!(get_application_properties(&topology, &missing, "client").is_err());
    }
}
