use float_cmp::approx_eq;

use tonegraph::{
    connect_series, Add, ChainLink, ConstantSource, Gain, Graph, GraphError, Multiply, Signal,
    SignalConfig, SignalNode,
};

const SAMPLE_RATE: f32 = 44_100.0;

fn output_of(graph: &Graph, node: &dyn SignalNode) -> f32 {
    graph.get_value(&node.output()).unwrap_or(f32::NAN)
}

#[test]
fn test_signal_emits_its_value() {
    let mut graph = Graph::new(SAMPLE_RATE);

    let sig = Signal::with_value(&mut graph, 3.0);
    graph.process().unwrap();
    assert!(approx_eq!(f32, output_of(&graph, &sig), 3.0, ulps = 2));

    sig.set_value(&mut graph, -1.5);
    graph.process().unwrap();
    assert!(approx_eq!(f32, output_of(&graph, &sig), -1.5, ulps = 2));
}

#[test]
fn test_signal_ramp() {
    let mut graph = Graph::new(SAMPLE_RATE);

    let sig = Signal::new(&mut graph);
    sig.ramp_to(&mut graph, 8.0, 8);
    for _ in 0..8 {
        graph.process().unwrap();
    }
    assert!(approx_eq!(f32, output_of(&graph, &sig), 8.0, ulps = 2));
}

#[test]
fn test_signal_config_merge_precedence() {
    let explicit = SignalConfig::new().value(2.0).merge(Signal::defaults());
    assert_eq!(explicit.value, Some(2.0));

    let fallback = SignalConfig::new().merge(Signal::defaults());
    assert_eq!(fallback.value, Some(0.0));
}

#[test]
fn test_connecting_into_a_signal_drives_its_value() {
    let mut graph = Graph::new(SAMPLE_RATE);

    let target = Signal::with_value(&mut graph, 5.0);
    let driver = Signal::with_value(&mut graph, 2.0);
    driver.connect(&mut graph, &target).unwrap();

    graph.process().unwrap();
    assert!(approx_eq!(f32, output_of(&graph, &target), 2.0, ulps = 2));
}

#[test]
fn test_add() {
    let mut graph = Graph::new(SAMPLE_RATE);

    let add = Add::with_value(&mut graph, 1.0).unwrap();
    let sig = Signal::with_value(&mut graph, 4.0);
    sig.connect(&mut graph, &add).unwrap();

    graph.process().unwrap();
    assert!(approx_eq!(f32, output_of(&graph, &add), 5.0, ulps = 2));
}

#[test]
fn test_multiply() {
    let mut graph = Graph::new(SAMPLE_RATE);

    let mult = Multiply::with_value(&mut graph, 4.0).unwrap();
    let sig = Signal::with_value(&mut graph, 3.0);
    sig.connect(&mut graph, &mult).unwrap();

    graph.process().unwrap();
    assert!(approx_eq!(f32, output_of(&graph, &mult), 12.0, ulps = 2));

    // A live factor overrides the resident one.
    let factor = Signal::with_value(&mut graph, 2.0);
    factor.connect_to(&mut graph, mult.factor()).unwrap();
    graph.process().unwrap();
    assert!(approx_eq!(f32, output_of(&graph, &mult), 6.0, ulps = 2));
}

#[test]
fn test_operators_compose() {
    // (4 + 1) * 3 - 2 = 13
    let mut graph = Graph::new(SAMPLE_RATE);

    let sig = Signal::with_value(&mut graph, 4.0);
    let add = Add::with_value(&mut graph, 1.0).unwrap();
    let mult = Multiply::with_value(&mut graph, 3.0).unwrap();
    let sub = tonegraph::Subtract::with_value(&mut graph, 2.0).unwrap();

    connect_series(
        &mut graph,
        &[(&sig).into(), (&add).into(), (&mult).into(), (&sub).into()],
    )
    .unwrap();

    graph.process().unwrap();
    assert!(approx_eq!(f32, output_of(&graph, &sub), 13.0, ulps = 2));
}

#[test]
fn test_connect_series_through_raw_nodes() {
    let mut graph = Graph::new(SAMPLE_RATE);

    let source = graph.add_node(ConstantSource::new(2.0));
    let first = graph.add_node(Gain::new(3.0));
    let second = graph.add_node(Gain::new(0.5));

    connect_series(&mut graph, &[source.into(), first.into(), second.into()]).unwrap();

    graph.process().unwrap();
    assert!(approx_eq!(f32, graph.get_value(&second.output).unwrap(), 3.0, ulps = 2));
}

#[test]
fn test_connect_series_rejects_inputless_target() {
    let mut graph = Graph::new(SAMPLE_RATE);

    let gain = graph.add_node(Gain::default());
    let source = graph.add_node(ConstantSource::new(1.0));

    // A constant source has no stream input, so it cannot sit downstream.
    let links: [ChainLink; 2] = [gain.into(), source.into()];
    let err = connect_series(&mut graph, &links).unwrap_err();
    assert!(matches!(err, GraphError::NotConnectable { index: 1 }));
}

#[test]
fn test_signal_node_names() {
    let mut graph = Graph::new(SAMPLE_RATE);

    let sig = Signal::new(&mut graph);
    let add = Add::new(&mut graph).unwrap();
    let mult = Multiply::new(&mut graph).unwrap();
    let sub = tonegraph::Subtract::new(&mut graph).unwrap();

    assert_eq!(sig.name(), "Signal");
    assert_eq!(add.name(), "Add");
    assert_eq!(mult.name(), "Multiply");
    assert_eq!(sub.name(), "Subtract");
}

#[test]
fn test_render_to_file() {
    let mut graph = Graph::new(SAMPLE_RATE);

    let sig = Signal::with_value(&mut graph, 0.25);
    let path = std::env::temp_dir().join("tonegraph_render_test.wav");
    let path_str = path.to_str().unwrap();

    graph.render_to_file(&sig.output(), 0.01, path_str).unwrap();

    assert!(path.exists());
    std::fs::remove_file(&path).unwrap();
}
