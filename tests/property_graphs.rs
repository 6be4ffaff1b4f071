// tests/property_graphs.rs

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use proptest::prelude::*;
use taskbraid::{TaskUnit, TaskUnitCluster};
use taskbraid_test_utils::builders::GraphBuilder;

fn unit_name(i: usize) -> String {
    format!("u{i:02}")
}

// Strategy to generate a random unit DAG as (days, dependency indices) per unit.
// Acyclicity is ensured by only letting unit N depend on units 0..N-1.
fn dag_strategy(max_units: usize) -> impl Strategy<Value = Vec<(i64, Vec<usize>)>> {
    (1..=max_units).prop_flat_map(|num_units| {
        proptest::collection::vec(
            (1..4i64, proptest::collection::vec(any::<usize>(), 0..3)),
            num_units,
        )
        .prop_map(|raw| {
            raw.into_iter()
                .enumerate()
                .map(|(i, (days, potential))| {
                    let deps: BTreeSet<usize> = if i == 0 {
                        BTreeSet::new()
                    } else {
                        potential.into_iter().map(|d| d % i).collect()
                    };
                    (days, deps.into_iter().collect::<Vec<usize>>())
                })
                .collect::<Vec<_>>()
        })
    })
}

fn build_graph(shape: &[(i64, Vec<usize>)]) -> GraphBuilder {
    let mut g = GraphBuilder::new();
    for (i, (days, deps)) in shape.iter().enumerate() {
        let names: Vec<String> = deps.iter().map(|d| unit_name(*d)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        g = g.unit_lasting(&unit_name(i), *days, &refs);
    }
    g
}

/// Units nothing else depends on, by name.
fn heads_of(g: &GraphBuilder) -> Vec<String> {
    let depended_on: HashSet<String> = g
        .units()
        .flat_map(|u| u.direct_dependencies().iter().map(|d| d.name().to_string()))
        .collect();
    g.units()
        .map(|u| u.name().to_string())
        .filter(|n| !depended_on.contains(n))
        .collect()
}

fn cluster_of(g: &GraphBuilder) -> TaskUnitCluster {
    let heads = heads_of(g);
    let refs: Vec<&str> = heads.iter().map(String::as_str).collect();
    g.cluster(&refs)
}

/// Count routes from `from` down to `to` by walking direct dependencies.
fn brute_force_paths(
    from: &Arc<TaskUnit>,
    to: &TaskUnit,
    memo: &mut HashMap<(String, String), usize>,
) -> usize {
    let key = (from.name().to_string(), to.name().to_string());
    if let Some(n) = memo.get(&key) {
        return *n;
    }
    let n = from
        .direct_dependencies()
        .iter()
        .map(|d| usize::from(d.id() == to.id()) + brute_force_paths(d, to, memo))
        .sum();
    memo.insert(key, n);
    n
}

fn grouping(cluster: &TaskUnitCluster) -> BTreeSet<Vec<String>> {
    cluster
        .paths()
        .iter()
        .map(|p| {
            let mut names: Vec<String> = p
                .chains()
                .iter()
                .flat_map(|c| c.units().iter().map(|u| u.name().to_string()))
                .collect();
            names.sort();
            names
        })
        .collect()
}

proptest! {
    #[test]
    fn path_counts_match_brute_force(shape in dag_strategy(10)) {
        let g = build_graph(&shape);
        let mut memo = HashMap::new();
        for from in g.units() {
            for to in g.units() {
                let expected = brute_force_paths(from, to, &mut memo);
                prop_assert_eq!(
                    from.get_number_of_paths_to_dependency(to),
                    expected,
                    "{} -> {}", from.name(), to.name()
                );
                prop_assert_eq!(from.is_dependent_on(to), expected > 0);
            }
        }
    }

    #[test]
    fn direct_dependencies_are_never_redundant(shape in dag_strategy(10)) {
        let g = build_graph(&shape);
        for unit in g.units() {
            let direct = unit.direct_dependencies();
            for a in direct {
                for b in direct {
                    prop_assert!(!a.is_dependent_on(b), "{} lists both {} and {}", unit.name(), a.name(), b.name());
                }
                prop_assert!(unit.apparent_start_date() >= a.apparent_end_date());
            }
        }
    }

    #[test]
    fn every_unit_lands_in_exactly_one_chain_and_path(shape in dag_strategy(12)) {
        let g = build_graph(&shape);
        let cluster = cluster_of(&g);

        prop_assert_eq!(cluster.unit_count(), g.units().count());

        let mut seen_units = HashSet::new();
        let mut seen_chains = HashSet::new();
        for path in cluster.paths() {
            prop_assert!(!path.chains().is_empty());
            for chain in path.chains() {
                prop_assert!(seen_chains.insert(chain.id()));
                let owner = cluster.get_path_of_chain(chain);
                prop_assert!(owner.is_ok());
                for unit in chain.units() {
                    prop_assert!(seen_units.insert(unit.id()));
                }
            }
        }
        prop_assert_eq!(seen_units.len(), g.units().count());
        prop_assert_eq!(seen_chains.len(), cluster.chain_map().len());

        // Chain members are welded one to one.
        for chain in cluster.chain_map().chains() {
            for pair in chain.units().windows(2) {
                let deps = pair[1].direct_dependencies();
                prop_assert_eq!(deps.len(), 1);
                prop_assert_eq!(deps[0].id(), pair[0].id());
            }
        }
    }

    #[test]
    fn ranking_is_a_permutation_of_paths(shape in dag_strategy(12)) {
        let g = build_graph(&shape);
        let cluster = cluster_of(&g);

        let mut all: Vec<_> = cluster.paths().iter().map(|p| p.id()).collect();
        let mut ranked: Vec<_> = cluster.paths_sorted_by_ranking().iter().map(|p| p.id()).collect();
        all.sort();
        ranked.sort();
        prop_assert_eq!(all, ranked);
    }

    #[test]
    fn durations_do_not_change_grouping(shape in dag_strategy(12)) {
        let uniform: Vec<(i64, Vec<usize>)> =
            shape.iter().map(|(_, deps)| (1, deps.clone())).collect();
        let varied = cluster_of(&build_graph(&shape));
        let flat = cluster_of(&build_graph(&uniform));
        prop_assert_eq!(grouping(&varied), grouping(&flat));
    }

    #[test]
    fn same_graph_gives_same_grouping(shape in dag_strategy(12)) {
        let first = cluster_of(&build_graph(&shape));
        let second = cluster_of(&build_graph(&shape));
        prop_assert_eq!(grouping(&first), grouping(&second));
    }
}
