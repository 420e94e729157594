// ==========================================
// PE 필름 생산 스케줄링 시스템 - 호환성 인덱스
// ==========================================
// 책임: 제품 → 호환 기계 집합 + 폭 그룹 군집
// 입력: 제품 카탈로그 + 기계 명단
// 출력: 실행 단위 불변 스냅샷 (카탈로그 변경 시 전체 재계산)
// ==========================================
// 폭 범위 겹침은 허용 오차 안에서만 대칭/추이적이므로
// 정렬이 아니라 쌍별 겹침 union-find로 그룹을 계산한다
// ==========================================

use crate::domain::machine::Machine;
use crate::domain::product::Product;
use crate::domain::types::WidthGroupId;
use crate::error::PlanningError;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument};

// ==========================================
// Union-Find (경로 압축 + 랭크)
// ==========================================
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            let root = self.find(self.parent[x]);
            self.parent[x] = root;
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

// ==========================================
// CompatibilityIndex - 호환성 인덱스
// ==========================================
// 실행 중 읽기 전용, 병렬 평가 시 Arc로 공유 가능
#[derive(Debug, Clone)]
pub struct CompatibilityIndex {
    /// 제품 코드 → 호환 기계 집합 (BTreeSet: 결정적 순회)
    compatible: BTreeMap<String, BTreeSet<String>>,
    /// 제품 코드 → 폭 그룹
    groups: BTreeMap<String, WidthGroupId>,
    /// 알려진 기계 집합 (APS 응답 검증용)
    known_machines: BTreeSet<String>,
}

impl CompatibilityIndex {
    /// 카탈로그로부터 인덱스 전체 재계산
    ///
    /// 증분 갱신은 지원하지 않는다. 겹침 판정이 허용 오차에
    /// 의존하므로 부분 갱신은 오래된 그룹 결과를 남길 수 있다.
    ///
    /// # 파라미터
    /// - products: 제품 카탈로그
    /// - machines: 기계 명단 (available=false는 호환 계산에서 제외)
    /// - width_tolerance_mm: 같은 그룹으로 묶는 폭 차이 상한
    #[instrument(skip(products, machines), fields(products = products.len(), machines = machines.len()))]
    pub fn build(
        products: &[Product],
        machines: &[Machine],
        width_tolerance_mm: i64,
    ) -> Result<Self, PlanningError> {
        if machines.is_empty() {
            return Err(PlanningError::EmptyMachineRoster);
        }

        let known_machines: BTreeSet<String> =
            machines.iter().map(|m| m.machine_id.clone()).collect();

        // === 1단계: 제품별 호환 기계 집합 ===
        let mut compatible: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for product in products {
            let set: BTreeSet<String> = machines
                .iter()
                .filter(|m| m.available && m.supports_width(product.width_mm))
                .map(|m| m.machine_id.clone())
                .collect();
            compatible.insert(product.product_code.clone(), set);
        }

        // === 2단계: 쌍별 겹침 union-find ===
        // 같은 그룹 조건: 폭 차이 ≤ 허용 오차 AND 호환 기계 1대 이상 공유
        let ordered: Vec<&Product> = {
            let mut v: Vec<&Product> = products.iter().collect();
            v.sort_by(|a, b| a.product_code.cmp(&b.product_code));
            v
        };
        let mut uf = UnionFind::new(ordered.len());
        for i in 0..ordered.len() {
            for j in (i + 1)..ordered.len() {
                let (a, b) = (ordered[i], ordered[j]);
                if (a.width_mm - b.width_mm).abs() > width_tolerance_mm {
                    continue;
                }
                let ma = &compatible[&a.product_code];
                let mb = &compatible[&b.product_code];
                if ma.intersection(mb).next().is_some() {
                    uf.union(i, j);
                }
            }
        }

        // === 3단계: 루트별 그룹 ID 부여 (제품 코드순 → 결정적) ===
        let mut groups: BTreeMap<String, WidthGroupId> = BTreeMap::new();
        let mut root_to_group: BTreeMap<usize, WidthGroupId> = BTreeMap::new();
        let mut next_group: u32 = 0;
        for (idx, product) in ordered.iter().enumerate() {
            let root = uf.find(idx);
            let group = *root_to_group.entry(root).or_insert_with(|| {
                let g = WidthGroupId(next_group);
                next_group += 1;
                g
            });
            groups.insert(product.product_code.clone(), group);
        }

        debug!(width_groups = next_group, "호환성 인덱스 재계산 완료");

        Ok(Self {
            compatible,
            groups,
            known_machines,
        })
    }

    /// 제품의 호환 기계 집합
    pub fn compatible_machines(&self, product_code: &str) -> Result<&BTreeSet<String>, PlanningError> {
        self.compatible
            .get(product_code)
            .ok_or_else(|| PlanningError::UnknownProduct {
                product_code: product_code.to_string(),
            })
    }

    /// 제품의 폭 그룹
    pub fn width_group(&self, product_code: &str) -> Result<WidthGroupId, PlanningError> {
        self.groups
            .get(product_code)
            .copied()
            .ok_or_else(|| PlanningError::UnknownProduct {
                product_code: product_code.to_string(),
            })
    }

    /// 기계가 명단에 존재하는지 검증 (APS 응답 검증 경로)
    pub fn assert_known_machine(&self, machine_id: &str) -> Result<(), PlanningError> {
        if self.known_machines.contains(machine_id) {
            Ok(())
        } else {
            Err(PlanningError::UnknownMachine {
                machine_id: machine_id.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ColorCategory;

    fn catalog() -> (Vec<Product>, Vec<Machine>) {
        let products = vec![
            Product::new("PE-FILM-500", 500, ColorCategory::Clear),
            Product::new("PE-FILM-600", 600, ColorCategory::Clear),
            Product::new("PE-FILM-800", 800, ColorCategory::Color),
            Product::new("PE-FILM-1600", 1600, ColorCategory::Clear),
        ];
        let machines = vec![
            Machine::new("M1", "1호기", 400, 600),
            Machine::new("M2", "2호기", 500, 800),
            Machine::new("M3", "3호기", 700, 1200),
        ];
        (products, machines)
    }

    #[test]
    fn compatible_machines_respect_width_range() {
        let (products, machines) = catalog();
        let index = CompatibilityIndex::build(&products, &machines, 100).unwrap();

        let m500: Vec<_> = index.compatible_machines("PE-FILM-500").unwrap().iter().collect();
        assert_eq!(m500, vec!["M1", "M2"]);

        let m800: Vec<_> = index.compatible_machines("PE-FILM-800").unwrap().iter().collect();
        assert_eq!(m800, vec!["M2", "M3"]);

        // 전 기계 폭 범위 밖 → 빈 집합 (에러 아님, 배정 단계에서 기각)
        assert!(index.compatible_machines("PE-FILM-1600").unwrap().is_empty());
    }

    #[test]
    fn width_groups_cluster_overlapping_products() {
        let (products, machines) = catalog();
        let index = CompatibilityIndex::build(&products, &machines, 100).unwrap();

        // 500/600: 폭 차 100mm 이내 + M1/M2 공유 → 같은 그룹
        assert_eq!(
            index.width_group("PE-FILM-500").unwrap(),
            index.width_group("PE-FILM-600").unwrap()
        );
        // 800은 600과 폭 차 200mm → 다른 그룹
        assert_ne!(
            index.width_group("PE-FILM-600").unwrap(),
            index.width_group("PE-FILM-800").unwrap()
        );
    }

    #[test]
    fn unavailable_machines_are_excluded() {
        let (products, mut machines) = catalog();
        machines[0].available = false;
        let index = CompatibilityIndex::build(&products, &machines, 100).unwrap();
        let m500: Vec<_> = index.compatible_machines("PE-FILM-500").unwrap().iter().collect();
        assert_eq!(m500, vec!["M2"]);
    }

    #[test]
    fn unknown_product_is_an_error() {
        let (products, machines) = catalog();
        let index = CompatibilityIndex::build(&products, &machines, 100).unwrap();
        assert!(matches!(
            index.compatible_machines("NOPE"),
            Err(PlanningError::UnknownProduct { .. })
        ));
        assert!(matches!(
            index.width_group("NOPE"),
            Err(PlanningError::UnknownProduct { .. })
        ));
    }

    #[test]
    fn empty_roster_is_fatal() {
        let (products, _) = catalog();
        assert!(matches!(
            CompatibilityIndex::build(&products, &[], 100),
            Err(PlanningError::EmptyMachineRoster)
        ));
    }

    #[test]
    fn rebuild_is_deterministic() {
        let (products, machines) = catalog();
        let a = CompatibilityIndex::build(&products, &machines, 100).unwrap();
        let b = CompatibilityIndex::build(&products, &machines, 100).unwrap();
        for p in &products {
            assert_eq!(
                a.width_group(&p.product_code).unwrap(),
                b.width_group(&p.product_code).unwrap()
            );
        }
    }
}
