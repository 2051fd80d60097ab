use float_cmp::approx_eq;

use crate::graph::types::InputEndpoint;
use crate::graph::{Graph, GraphError, Output, Param};
use crate::nodes::{ConstantSource, Gain, Negate};

const SAMPLE_RATE: f32 = 44_100.0;

fn output_of(graph: &Graph, output: &crate::graph::StreamOutput) -> f32 {
    graph.get_value(output).unwrap_or(f32::NAN)
}

#[test]
fn test_constant_through_gain() {
    let mut graph = Graph::new(SAMPLE_RATE);

    let source = graph.add_node(ConstantSource::new(2.0));
    let gain = graph.add_node(Gain::new(3.0));

    graph.connect(source.output, gain.input).unwrap();
    graph.process().unwrap();

    assert!(approx_eq!(f32, output_of(&graph, &gain.output), 6.0, ulps = 2));
}

#[test]
fn test_insertion_order_does_not_matter() {
    let mut graph = Graph::new(SAMPLE_RATE);

    // Downstream node added first; scheduling must still run the source
    // before the gain within the same sample.
    let gain = graph.add_node(Gain::new(0.5));
    let source = graph.add_node(ConstantSource::new(8.0));

    graph.connect(source.output, gain.input).unwrap();
    graph.process().unwrap();

    assert!(approx_eq!(f32, output_of(&graph, &gain.output), 4.0, ulps = 2));
}

#[test]
fn test_cycle_is_rejected() {
    let mut graph = Graph::new(SAMPLE_RATE);

    let a = graph.add_node(Gain::default());
    let b = graph.add_node(Gain::default());

    graph.connect(a.output, b.input).unwrap();
    graph.connect(b.output, a.input).unwrap();

    match graph.process() {
        Err(GraphError::CycleDetected(nodes)) => assert_eq!(nodes.len(), 2),
        other => panic!("expected cycle error, got {:?}", other),
    }
}

#[test]
fn test_self_connection_is_rejected() {
    let mut graph = Graph::new(SAMPLE_RATE);
    let gain = graph.add_node(Gain::default());

    let err = graph
        .connect(gain.output, InputEndpoint::new(Output::key(&gain.output)))
        .unwrap_err();
    assert!(matches!(err, GraphError::SelfConnection(_)));
}

#[test]
fn test_output_to_output_is_rejected() {
    let mut graph = Graph::new(SAMPLE_RATE);
    let a = graph.add_node(ConstantSource::new(1.0));
    let b = graph.add_node(ConstantSource::new(2.0));

    let err = graph
        .connect(a.output, InputEndpoint::new(Output::key(&b.output)))
        .unwrap_err();
    assert!(matches!(err, GraphError::DirectionMismatch { .. }));
}

#[test]
fn test_connecting_removed_node_fails() {
    let mut graph = Graph::new(SAMPLE_RATE);
    let source = graph.add_node(ConstantSource::new(1.0));
    let gain = graph.add_node(Gain::default());

    assert!(graph.remove_node(source.node));
    assert!(!graph.remove_node(source.node));

    let err = graph.connect(source.output, gain.input).unwrap_err();
    assert!(matches!(err, GraphError::UnknownPort(_)));
}

#[test]
fn test_multiple_inputs_sum() {
    let mut graph = Graph::new(SAMPLE_RATE);

    let a = graph.add_node(ConstantSource::new(2.0));
    let b = graph.add_node(ConstantSource::new(3.0));
    let c = graph.add_node(ConstantSource::new(2.0));
    let junction = graph.add_node(Gain::default());

    graph.connect(a.output, junction.input).unwrap();
    graph.connect(b.output, junction.input).unwrap();
    graph.connect(c.output, junction.input).unwrap();

    assert_eq!(graph.fan_in(junction.input), 3);

    graph.process().unwrap();
    assert!(approx_eq!(f32, output_of(&graph, &junction.output), 7.0, ulps = 2));
}

#[test]
fn test_connection_overrides_resident_value() {
    let mut graph = Graph::new(SAMPLE_RATE);

    let target = graph.add_node(ConstantSource::new(5.0));
    let driver = graph.add_node(ConstantSource::new(2.0));

    graph.process().unwrap();
    assert!(approx_eq!(f32, output_of(&graph, &target.output), 5.0, ulps = 2));

    graph.connect(driver.output, target.value).unwrap();
    graph.process().unwrap();
    assert!(approx_eq!(f32, output_of(&graph, &target.output), 2.0, ulps = 2));

    // Resident constant survives the override and returns on disconnect.
    assert!(graph.disconnect(driver.output, target.value));
    graph.process().unwrap();
    assert!(approx_eq!(f32, output_of(&graph, &target.output), 5.0, ulps = 2));
}

#[test]
fn test_disconnect_reports_whether_edge_existed() {
    let mut graph = Graph::new(SAMPLE_RATE);
    let source = graph.add_node(ConstantSource::new(1.0));
    let gain = graph.add_node(Gain::default());

    assert!(!graph.disconnect(source.output, gain.input));
    graph.connect(source.output, gain.input).unwrap();
    assert!(graph.disconnect(source.output, gain.input));
    assert!(!graph.disconnect(source.output, gain.input));
}

#[test]
fn test_remove_node_clears_its_edges() {
    let mut graph = Graph::new(SAMPLE_RATE);
    let source = graph.add_node(ConstantSource::new(1.0));
    let gain = graph.add_node(Gain::default());

    graph.connect(source.output, gain.input).unwrap();
    assert_eq!(graph.fan_in(gain.input), 1);

    graph.remove_node(source.node);
    assert_eq!(graph.fan_in(gain.input), 0);
    graph.process().unwrap();
}

#[test]
fn test_disconnect_node_keeps_it_alive() {
    let mut graph = Graph::new(SAMPLE_RATE);
    let source = graph.add_node(ConstantSource::new(4.0));
    let gain = graph.add_node(Gain::default());

    graph.connect(source.output, gain.input).unwrap();
    assert!(graph.disconnect_node(gain.node));
    assert_eq!(graph.fan_in(gain.input), 0);

    // Ports are still valid, so the node can be rewired.
    graph.connect(source.output, gain.input).unwrap();
    graph.process().unwrap();
    assert!(approx_eq!(f32, output_of(&graph, &gain.output), 4.0, ulps = 2));
}

#[test]
fn test_ramp_reaches_target() {
    let mut graph = Graph::new(SAMPLE_RATE);
    let source = graph.add_node(ConstantSource::new(0.0));
    let param = Param::new(source.value);

    graph.ramp_param(param, 10.0, 10);
    assert!(graph.is_param_ramping(param));

    for _ in 0..10 {
        graph.process().unwrap();
    }

    assert!(!graph.is_param_ramping(param));
    assert!(approx_eq!(f32, graph.param_value(param).unwrap(), 10.0, ulps = 2));
    assert!(approx_eq!(f32, output_of(&graph, &source.output), 10.0, ulps = 2));
}

#[test]
fn test_ramp_is_linear() {
    let mut graph = Graph::new(SAMPLE_RATE);
    let source = graph.add_node(ConstantSource::new(0.0));
    let param = Param::new(source.value);

    graph.ramp_param(param, 4.0, 4);
    graph.process().unwrap();
    assert!(approx_eq!(f32, output_of(&graph, &source.output), 1.0, ulps = 2));
    graph.process().unwrap();
    assert!(approx_eq!(f32, output_of(&graph, &source.output), 2.0, ulps = 2));
}

#[test]
fn test_zero_length_ramp_is_immediate() {
    let mut graph = Graph::new(SAMPLE_RATE);
    let source = graph.add_node(ConstantSource::new(1.0));
    let param = Param::new(source.value);

    graph.ramp_param(param, 6.0, 0);
    assert!(!graph.is_param_ramping(param));
    assert!(approx_eq!(f32, graph.param_value(param).unwrap(), 6.0, ulps = 2));
}

#[test]
fn test_set_value_cancels_ramp() {
    let mut graph = Graph::new(SAMPLE_RATE);
    let source = graph.add_node(ConstantSource::new(0.0));
    let param = Param::new(source.value);

    graph.ramp_param(param, 100.0, 1000);
    graph.set_param(param, 3.0);
    assert!(!graph.is_param_ramping(param));

    graph.process().unwrap();
    assert!(approx_eq!(f32, output_of(&graph, &source.output), 3.0, ulps = 2));
}

#[test]
fn test_new_ramp_replaces_previous() {
    let mut graph = Graph::new(SAMPLE_RATE);
    let source = graph.add_node(ConstantSource::new(0.0));
    let param = Param::new(source.value);

    graph.ramp_param(param, 100.0, 1000);
    graph.ramp_param(param, 2.0, 2);

    graph.process().unwrap();
    graph.process().unwrap();

    assert!(!graph.is_param_ramping(param));
    assert!(approx_eq!(f32, graph.param_value(param).unwrap(), 2.0, ulps = 2));
}

#[test]
fn test_port_descriptors_are_exposed() {
    let mut graph = Graph::new(SAMPLE_RATE);
    let gain = graph.add_node(Gain::default());

    let descriptor = graph.port_descriptor(gain.gain.key()).unwrap();
    assert_eq!(descriptor.name, "gain");
    assert_eq!(graph.node_for_port(gain.gain.key()), Some(gain.node));
}

#[test]
fn test_connection_builder_fan_out() {
    let mut graph = Graph::new(SAMPLE_RATE);

    let source = graph.add_node(ConstantSource::new(2.0));
    let a = graph.add_node(Gain::new(3.0));
    let b = graph.add_node(Gain::default());

    graph
        .connect_all(vec![source.output >> a.input, source.output >> b.gain])
        .unwrap();

    graph.process().unwrap();
    assert!(approx_eq!(f32, output_of(&graph, &a.output), 6.0, ulps = 2));
}

#[test]
fn test_negate_flips_sign() {
    let mut graph = Graph::new(SAMPLE_RATE);

    let source = graph.add_node(ConstantSource::new(3.0));
    let negate = graph.add_node(Negate::new());

    graph.connect(source.output, negate.input).unwrap();
    graph.process().unwrap();

    assert!(approx_eq!(f32, output_of(&graph, &negate.output), -3.0, ulps = 2));
}
