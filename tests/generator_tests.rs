#[cfg(test)]
mod generator_tests {
    use std::collections::HashSet;
    use std::io::Cursor;

    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::{json, Value};

    use nsim::error::{GenerateError, ParameterError};
    use nsim::model::Identified;
    use nsim::parameters::{GeneratorOptions, OptionsSource, PromptSource};
    use nsim::topology::{LeafKind, Node, TopologyGenerator};
    use nsim::traffic::{Traversal, TrafficGenerator};

    fn options(value: Value) -> GeneratorOptions {
        value.as_object().cloned().unwrap_or_default()
    }

    fn generate_topology(generator: TopologyGenerator, value: Value, seed: u64) -> Node {
        let mut params = OptionsSource::new(options(value));
        let mut rng = StdRng::seed_from_u64(seed);
        generator.generate(&mut params, &mut rng).unwrap()
    }

    #[test]
    fn test_full_mesh_links_every_ordered_pair() {
        let node = generate_topology(
            TopologyGenerator::Mesh,
            json!({"name": "m", "node_count": 6, "connectivity": 1.0}),
            1,
        );

        let leaves = node.flatten();
        assert_eq!(leaves.len(), 6);
        for leaf in &leaves {
            let destinations: HashSet<&str> = leaf.edges().iter().map(|e| e.destination()).collect();
            assert_eq!(destinations.len(), 5);
            assert!(!destinations.contains(leaf.id()));
        }
    }

    #[test]
    fn test_empty_mesh_has_no_edges() {
        let node = generate_topology(
            TopologyGenerator::Mesh,
            json!({"name": "m", "node_count": 8, "connectivity": 0.0}),
            2,
        );
        assert_eq!(node.leaf_count(), 8);
        assert_eq!(node.edge_count(), 0);
    }

    #[test]
    fn test_full_star_shape() {
        let node = generate_topology(
            TopologyGenerator::Star,
            json!({"name": "s", "node_count": 5, "connectivity": "1"}),
            3,
        );

        let leaves = node.flatten();
        assert_eq!(leaves.len(), 6);
        let center = leaves[5];
        assert_eq!(center.id(), "s-center");
        assert_eq!(center.kind(), LeafKind::Switch);
        assert_eq!(center.edges().len(), 5);

        for host in &leaves[..5] {
            assert_eq!(host.kind(), LeafKind::Host);
            assert_eq!(host.edges().len(), 1);
            assert_eq!(host.edges()[0].destination(), "s-center");
        }
    }

    #[test]
    fn test_seed_makes_generation_repeatable() {
        let settings = json!({"name": "r", "node_count": 12, "connectivity": 0.3});
        let first = generate_topology(TopologyGenerator::Mesh, settings.clone(), 77);
        let second = generate_topology(TopologyGenerator::Mesh, settings, 77);
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_topology_options() {
        let mut rng = StdRng::seed_from_u64(4);

        let mut params = OptionsSource::new(options(json!({"name": "", "node_count": 3, "connectivity": 0.5})));
        assert!(matches!(
            TopologyGenerator::Mesh.generate(&mut params, &mut rng),
            Err(ParameterError::Constraint { .. })
        ));

        let mut params = OptionsSource::new(options(json!({"name": "x", "node_count": 3, "connectivity": 1.5})));
        assert!(TopologyGenerator::Star.generate(&mut params, &mut rng).is_err());

        let mut params = OptionsSource::new(options(json!({"name": "x", "node_count": -1, "connectivity": 0.5})));
        assert!(matches!(
            TopologyGenerator::Mesh.generate(&mut params, &mut rng),
            Err(ParameterError::Unparseable { .. })
        ));
    }

    #[test]
    fn test_prompting_fills_missing_values() {
        let input = Cursor::new("\n-3\n4\n0.5\n");
        let mut output = Vec::new();
        let node = {
            let mut params = PromptSource::new(options(json!({"name": "p"})), input, &mut output);
            let mut rng = StdRng::seed_from_u64(5);
            TopologyGenerator::Mesh.generate(&mut params, &mut rng).unwrap()
        };

        assert_eq!(node.leaf_count(), 4);
        let prompts = String::from_utf8(output).unwrap();
        assert_eq!(prompts.matches("Please enter the number of nodes").count(), 3);
        assert_eq!(prompts.matches("Please enter the connectivity").count(), 1);
    }

    #[test]
    fn test_traffic_follows_reachable_routes() {
        let node = generate_topology(
            TopologyGenerator::Star,
            json!({"name": "s", "node_count": 6, "connectivity": 0.8}),
            6,
        );
        let traversal = Traversal::new(&node);

        for generator in TrafficGenerator::ALL {
            let mut params = OptionsSource::new(options(json!({
                "duration": "1m",
                "rate": 2.0,
                "lambda": 2.0,
                "inter_train_time": 1.0,
                "inter_car_time": 0.1,
                "max_train_length": 5
            })));
            let mut rng = StdRng::seed_from_u64(7);
            let traffic = generator.generate(&node, &mut params, &mut rng).unwrap();

            assert_eq!(traffic.id(), "s-traffic");
            assert!(!traffic.is_empty());
            for arrival in traffic.arrivals() {
                let reachable = traversal.reachable(arrival.source()).unwrap();
                assert!(reachable.iter().any(|leaf| leaf.id() == arrival.destination()));
                assert!(arrival.time() <= 60.0);
                assert!((512..=1500).contains(&arrival.size()));
            }
        }
    }

    #[test]
    fn test_traffic_without_routes() {
        let node = generate_topology(
            TopologyGenerator::Mesh,
            json!({"name": "m", "node_count": 3, "connectivity": 0.0}),
            8,
        );
        let mut params = OptionsSource::new(options(json!({"duration": 10, "lambda": 1})));
        let mut rng = StdRng::seed_from_u64(9);

        match TrafficGenerator::Poisson.generate(&node, &mut params, &mut rng) {
            Err(GenerateError::ExhaustedRoute(error)) => assert_eq!(error.topology, "m"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
