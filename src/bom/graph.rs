use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::ProductType;

/// A single "is composed of" edge.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentEdge {
    pub component_id: Uuid,
    pub quantity: Decimal,
}

/// Snapshot of one product as the graph engine sees it.
#[derive(Debug, Clone)]
pub struct ProductNode {
    pub product_type: ProductType,
    pub cost_price: Decimal,
    pub current_stock: Decimal,
    /// Edges in stored order
    pub components: Vec<ComponentEdge>,
}

/// Availability verdict for one product at one level of the tree.
///
/// For a composed product the verdict either reports the first deficient
/// leaf found (depth-first, stored edge order) or the composed product's
/// own stock when everything underneath is available.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Availability {
    pub product_id: Uuid,
    pub available: bool,
    pub current_stock: Decimal,
    pub required: Decimal,
}

/// One line of a multi-level requirements explosion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplodedComponent {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub level: u32,
}

/// Edge rejected because it would close a composition loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleDetected {
    pub product_id: Uuid,
    pub component_id: Uuid,
}

/// In-memory snapshot of the product composition graph, adjacency list
/// keyed by product id.
#[derive(Debug, Default, Clone)]
pub struct BomGraph {
    nodes: HashMap<Uuid, ProductNode>,
}

impl BomGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_node(&mut self, id: Uuid, node: ProductNode) {
        self.nodes.insert(id, node);
    }

    pub fn node(&self, id: Uuid) -> Option<&ProductNode> {
        self.nodes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Would adding the edge `product -> component` close a loop?
    ///
    /// True when the component is the product itself, or when the product
    /// is reachable from the component along existing edges. The visited
    /// set keeps diamond-shaped (but acyclic) graphs from being
    /// re-traversed.
    pub fn would_create_cycle(&self, product_id: Uuid, component_id: Uuid) -> bool {
        if product_id == component_id {
            return true;
        }
        let mut visited = HashSet::new();
        self.reaches(component_id, product_id, &mut visited)
    }

    fn reaches(&self, from: Uuid, target: Uuid, visited: &mut HashSet<Uuid>) -> bool {
        if !visited.insert(from) {
            return false;
        }
        let Some(node) = self.nodes.get(&from) else {
            return false;
        };
        for edge in &node.components {
            if edge.component_id == target || self.reaches(edge.component_id, target, visited) {
                return true;
            }
        }
        false
    }

    /// Validates a full replacement component list for `product_id`,
    /// returning the first offending edge.
    pub fn validate_components(
        &self,
        product_id: Uuid,
        components: &[ComponentEdge],
    ) -> Result<(), CycleDetected> {
        for edge in components {
            if self.would_create_cycle(product_id, edge.component_id) {
                return Err(CycleDetected {
                    product_id,
                    component_id: edge.component_id,
                });
            }
        }
        Ok(())
    }

    /// Recursive cost of one unit of `product_id`.
    ///
    /// Raw materials answer with their stored cost price (the authoritative
    /// leaf cost); composed products sum component costs scaled by
    /// quantity. A product missing from the snapshot costs zero, so lookups
    /// racing a deletion stay benign. The memo only spares diamond
    /// dependencies from recomputation; the graph is acyclic by invariant.
    pub fn rollup_cost(&self, product_id: Uuid) -> Decimal {
        let mut memo = HashMap::new();
        self.rollup_cost_memo(product_id, &mut memo)
    }

    fn rollup_cost_memo(&self, product_id: Uuid, memo: &mut HashMap<Uuid, Decimal>) -> Decimal {
        if let Some(cost) = memo.get(&product_id) {
            return *cost;
        }
        let Some(node) = self.nodes.get(&product_id) else {
            return Decimal::ZERO;
        };
        let cost = if node.product_type.is_raw_material() {
            node.cost_price
        } else {
            node.components
                .iter()
                .map(|edge| self.rollup_cost_memo(edge.component_id, memo) * edge.quantity)
                .sum()
        };
        memo.insert(product_id, cost);
        cost
    }

    /// Read-only check that `required` units of `product_id` can be
    /// consumed at every level of the tree.
    ///
    /// Short-circuits on the first deficient component (depth-first, stored
    /// edge order) instead of aggregating every deficiency.
    pub fn check_availability(&self, product_id: Uuid, required: Decimal) -> Availability {
        let Some(node) = self.nodes.get(&product_id) else {
            return Availability {
                product_id,
                available: false,
                current_stock: Decimal::ZERO,
                required,
            };
        };
        if node.product_type.is_raw_material() {
            return Availability {
                product_id,
                available: node.current_stock >= required,
                current_stock: node.current_stock,
                required,
            };
        }
        for edge in &node.components {
            let verdict = self.check_availability(edge.component_id, edge.quantity * required);
            if !verdict.available {
                return verdict;
            }
        }
        Availability {
            product_id,
            available: true,
            current_stock: node.current_stock,
            required,
        }
    }

    /// Multi-level requirements explosion: every component needed to build
    /// `quantity` units, scaled multiplicatively along each path.
    pub fn explode(&self, product_id: Uuid, quantity: Decimal) -> Vec<ExplodedComponent> {
        let mut out = Vec::new();
        self.explode_into(product_id, quantity, 1, &mut out);
        out
    }

    fn explode_into(
        &self,
        product_id: Uuid,
        quantity: Decimal,
        level: u32,
        out: &mut Vec<ExplodedComponent>,
    ) {
        let Some(node) = self.nodes.get(&product_id) else {
            return;
        };
        for edge in &node.components {
            let component_quantity = edge.quantity * quantity;
            out.push(ExplodedComponent {
                product_id: edge.component_id,
                quantity: component_quantity,
                level,
            });
            self.explode_into(edge.component_id, component_quantity, level + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn raw(cost: Decimal, stock: Decimal) -> ProductNode {
        ProductNode {
            product_type: ProductType::RawMaterial,
            cost_price: cost,
            current_stock: stock,
            components: Vec::new(),
        }
    }

    fn composed(
        product_type: ProductType,
        cost: Decimal,
        stock: Decimal,
        components: Vec<ComponentEdge>,
    ) -> ProductNode {
        ProductNode {
            product_type,
            cost_price: cost,
            current_stock: stock,
            components,
        }
    }

    fn edge(component_id: Uuid, quantity: Decimal) -> ComponentEdge {
        ComponentEdge {
            component_id,
            quantity,
        }
    }

    /// Door = 0.5x MDF + 2x Hinge, the worked catalog example.
    fn door_graph() -> (BomGraph, Uuid, Uuid, Uuid) {
        let mdf = Uuid::new_v4();
        let hinge = Uuid::new_v4();
        let door = Uuid::new_v4();

        let mut graph = BomGraph::new();
        graph.insert_node(mdf, raw(dec!(85.50), dec!(50)));
        graph.insert_node(hinge, raw(dec!(12.50), dec!(200)));
        graph.insert_node(
            door,
            composed(
                ProductType::FinishedProduct,
                dec!(67.75),
                dec!(10),
                vec![edge(mdf, dec!(0.5)), edge(hinge, dec!(2))],
            ),
        );
        (graph, door, mdf, hinge)
    }

    #[test]
    fn rollup_cost_of_raw_material_is_its_cost_price() {
        let (graph, _, mdf, _) = door_graph();
        assert_eq!(graph.rollup_cost(mdf), dec!(85.50));
    }

    #[test]
    fn rollup_cost_sums_components_scaled_by_quantity() {
        let (graph, door, _, _) = door_graph();
        // 0.5 * 85.50 + 2 * 12.50
        assert_eq!(graph.rollup_cost(door), dec!(67.75));
    }

    #[test]
    fn rollup_cost_of_missing_product_is_zero() {
        let (graph, _, _, _) = door_graph();
        assert_eq!(graph.rollup_cost(Uuid::new_v4()), Decimal::ZERO);
    }

    #[test]
    fn rollup_cost_recurses_through_sub_parts() {
        let (mut graph, door, _, _) = door_graph();
        let cabinet = Uuid::new_v4();
        graph.insert_node(
            cabinet,
            composed(
                ProductType::FinishedProduct,
                Decimal::ZERO,
                Decimal::ZERO,
                vec![edge(door, dec!(4))],
            ),
        );
        assert_eq!(graph.rollup_cost(cabinet), dec!(271.00));
    }

    #[test]
    fn rollup_cost_ignores_stored_cost_of_composed_products() {
        let (mut graph, door, mdf, hinge) = door_graph();
        // Stale snapshot on the door row must not leak into the roll-up.
        graph.insert_node(
            door,
            composed(
                ProductType::FinishedProduct,
                dec!(999.99),
                dec!(10),
                vec![edge(mdf, dec!(0.5)), edge(hinge, dec!(2))],
            ),
        );
        assert_eq!(graph.rollup_cost(door), dec!(67.75));
    }

    #[test]
    fn rollup_cost_handles_diamond_dependencies() {
        let screw = Uuid::new_v4();
        let panel = Uuid::new_v4();
        let frame = Uuid::new_v4();
        let wardrobe = Uuid::new_v4();

        let mut graph = BomGraph::new();
        graph.insert_node(screw, raw(dec!(0.10), dec!(1000)));
        graph.insert_node(
            panel,
            composed(
                ProductType::SubPart,
                Decimal::ZERO,
                Decimal::ZERO,
                vec![edge(screw, dec!(8))],
            ),
        );
        graph.insert_node(
            frame,
            composed(
                ProductType::SubPart,
                Decimal::ZERO,
                Decimal::ZERO,
                vec![edge(screw, dec!(12))],
            ),
        );
        graph.insert_node(
            wardrobe,
            composed(
                ProductType::FinishedProduct,
                Decimal::ZERO,
                Decimal::ZERO,
                vec![edge(panel, dec!(3)), edge(frame, dec!(2))],
            ),
        );

        // 3 * 8 * 0.10 + 2 * 12 * 0.10
        assert_eq!(graph.rollup_cost(wardrobe), dec!(4.80));
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let (graph, door, _, _) = door_graph();
        assert!(graph.would_create_cycle(door, door));
    }

    #[test]
    fn direct_back_edge_is_a_cycle() {
        let (graph, door, mdf, _) = door_graph();
        // Door -> MDF exists; MDF -> Door would close the loop.
        assert!(graph.would_create_cycle(mdf, door));
    }

    #[test]
    fn transitive_back_edge_is_a_cycle() {
        let (mut graph, door, mdf, _) = door_graph();
        let cabinet = Uuid::new_v4();
        graph.insert_node(
            cabinet,
            composed(
                ProductType::FinishedProduct,
                Decimal::ZERO,
                Decimal::ZERO,
                vec![edge(door, dec!(4))],
            ),
        );
        // MDF -> Cabinet -> Door -> MDF
        assert!(graph.would_create_cycle(mdf, cabinet));
    }

    #[test]
    fn forward_edge_into_shared_component_is_not_a_cycle() {
        let (graph, door, _, hinge) = door_graph();
        // Another product may freely reuse the hinge.
        assert!(!graph.would_create_cycle(door, hinge));
        let drawer = Uuid::new_v4();
        assert!(!graph.would_create_cycle(drawer, hinge));
    }

    #[test]
    fn validate_components_reports_first_offender() {
        let (graph, door, mdf, hinge) = door_graph();
        let err = graph
            .validate_components(mdf, &[edge(hinge, dec!(1)), edge(door, dec!(1))])
            .unwrap_err();
        assert_eq!(err.product_id, mdf);
        assert_eq!(err.component_id, door);
    }

    #[test]
    fn availability_of_raw_material_compares_stock() {
        let (graph, _, mdf, _) = door_graph();
        let ok = graph.check_availability(mdf, dec!(50));
        assert!(ok.available);
        let short = graph.check_availability(mdf, dec!(50.01));
        assert!(!short.available);
        assert_eq!(short.current_stock, dec!(50));
    }

    #[test]
    fn availability_reports_first_deficient_component() {
        let (graph, door, mdf, _) = door_graph();
        // 1000 doors need 500 MDF (only 50 on hand) and 2000 hinges; the
        // MDF deficiency must be reported without aggregating the hinges.
        let verdict = graph.check_availability(door, dec!(1000));
        assert_eq!(
            verdict,
            Availability {
                product_id: mdf,
                available: false,
                current_stock: dec!(50),
                required: dec!(500),
            }
        );
    }

    #[test]
    fn availability_of_composed_product_reports_own_stock_when_satisfied() {
        let (graph, door, _, _) = door_graph();
        let verdict = graph.check_availability(door, dec!(100));
        assert_eq!(
            verdict,
            Availability {
                product_id: door,
                available: true,
                current_stock: dec!(10),
                required: dec!(100),
            }
        );
    }

    #[test]
    fn availability_checks_every_level_of_the_tree() {
        let (mut graph, door, _, _) = door_graph();
        let cabinet = Uuid::new_v4();
        graph.insert_node(
            cabinet,
            composed(
                ProductType::FinishedProduct,
                Decimal::ZERO,
                dec!(1),
                vec![edge(door, dec!(4))],
            ),
        );
        // 30 cabinets -> 120 doors -> 60 MDF, more than the 50 on hand.
        let verdict = graph.check_availability(cabinet, dec!(30));
        assert!(!verdict.available);
        assert_eq!(verdict.required, dec!(60));
    }

    #[test]
    fn availability_of_missing_product_is_unavailable() {
        let (graph, _, _, _) = door_graph();
        let missing = Uuid::new_v4();
        let verdict = graph.check_availability(missing, dec!(1));
        assert!(!verdict.available);
        assert_eq!(verdict.current_stock, Decimal::ZERO);
        assert_eq!(verdict.required, dec!(1));
    }

    #[test]
    fn explode_scales_quantities_multiplicatively() {
        let (mut graph, door, mdf, hinge) = door_graph();
        let cabinet = Uuid::new_v4();
        graph.insert_node(
            cabinet,
            composed(
                ProductType::FinishedProduct,
                Decimal::ZERO,
                Decimal::ZERO,
                vec![edge(door, dec!(2))],
            ),
        );

        let lines = graph.explode(cabinet, dec!(10));
        assert_eq!(
            lines,
            vec![
                ExplodedComponent {
                    product_id: door,
                    quantity: dec!(20),
                    level: 1
                },
                ExplodedComponent {
                    product_id: mdf,
                    quantity: dec!(10.0),
                    level: 2
                },
                ExplodedComponent {
                    product_id: hinge,
                    quantity: dec!(40),
                    level: 2
                },
            ]
        );
    }

    #[test]
    fn explode_of_raw_material_is_empty() {
        let (graph, _, mdf, _) = door_graph();
        assert!(graph.explode(mdf, dec!(10)).is_empty());
    }

    /// Exhaustive DFS used only to cross-check the guard in the property
    /// test below.
    fn has_cycle(graph: &BomGraph, ids: &[Uuid]) -> bool {
        fn visit(
            graph: &BomGraph,
            id: Uuid,
            in_progress: &mut HashSet<Uuid>,
            done: &mut HashSet<Uuid>,
        ) -> bool {
            if done.contains(&id) {
                return false;
            }
            if !in_progress.insert(id) {
                return true;
            }
            if let Some(node) = graph.node(id) {
                for edge in &node.components {
                    if visit(graph, edge.component_id, in_progress, done) {
                        return true;
                    }
                }
            }
            in_progress.remove(&id);
            done.insert(id);
            false
        }

        let mut done = HashSet::new();
        ids.iter().any(|id| {
            let mut in_progress = HashSet::new();
            visit(graph, *id, &mut in_progress, &mut done)
        })
    }

    proptest! {
        /// Any sequence of edge insertions filtered through the cycle guard
        /// leaves the graph acyclic.
        #[test]
        fn guarded_insertions_never_admit_a_cycle(
            raw_edges in proptest::collection::vec((0usize..8, 0usize..8), 0..40)
        ) {
            let ids: Vec<Uuid> = (0..8).map(|_| Uuid::new_v4()).collect();
            let mut graph = BomGraph::new();
            for id in &ids {
                graph.insert_node(
                    *id,
                    ProductNode {
                        product_type: ProductType::SubPart,
                        cost_price: Decimal::ONE,
                        current_stock: Decimal::ZERO,
                        components: Vec::new(),
                    },
                );
            }

            for (from, to) in raw_edges {
                let (product, component) = (ids[from], ids[to]);
                if !graph.would_create_cycle(product, component) {
                    let mut node = graph.node(product).cloned().unwrap();
                    node.components.push(ComponentEdge {
                        component_id: component,
                        quantity: Decimal::ONE,
                    });
                    graph.insert_node(product, node);
                }
                prop_assert!(!has_cycle(&graph, &ids));
            }
        }
    }
}
