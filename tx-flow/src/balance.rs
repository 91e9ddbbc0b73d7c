use crate::types::{BalanceMap, UnblindedOutput};

/// Sums the recovered amounts of wallet outputs per asset.
///
/// Outputs without a secret are not readable yet and are left out.
pub fn aggregate_balances(outputs: &[UnblindedOutput]) -> BalanceMap {
    let mut balances = BalanceMap::new();
    for output in outputs {
        let Some(ref secret) = output.unblinding_secret else {
            continue;
        };

        *balances.entry(secret.asset.clone()).or_insert(0) += secret.value;
    }

    balances
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UnblindingSecret;
    use elements::hashes::Hash;
    use elements::{OutPoint, Txid};
    use proptest::prelude::*;

    fn output(vout: u32, secret: Option<(u64, &str)>) -> UnblindedOutput {
        UnblindedOutput {
            outpoint: OutPoint::new(Txid::all_zeros(), vout),
            unblinding_secret: secret.map(|(value, asset)| UnblindingSecret {
                value,
                asset: asset.to_string(),
                asset_blinding_factor: "00".repeat(32),
                value_blinding_factor: "00".repeat(32),
            }),
        }
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate_balances(&[]).is_empty());
    }

    #[test]
    fn test_aggregate_balances() {
        let a = "aa".repeat(32);
        let b = "bb".repeat(32);
        let outputs = vec![
            output(0, Some((100, &a))),
            output(1, Some((250, &b))),
            output(2, None),
            output(3, Some((50, &a))),
            output(4, Some((0, &b))),
        ];

        let balances = aggregate_balances(&outputs);
        assert_eq!(balances.len(), 2);
        assert_eq!(balances[&a], 150);
        assert_eq!(balances[&b], 250);
    }

    #[test]
    fn test_outputs_without_secret_only() {
        let outputs = vec![output(0, None), output(1, None)];
        assert!(aggregate_balances(&outputs).is_empty());
    }

    fn arb_outputs() -> impl Strategy<Value = Vec<UnblindedOutput>> {
        let assets = ["aa", "bb", "cc"];
        prop::collection::vec(
            (0usize..3, 0u64..1_000_000_000, prop::bool::weighted(0.8)),
            0..40,
        )
        .prop_map(move |items| {
            items
                .into_iter()
                .enumerate()
                .map(|(i, (asset, value, known))| {
                    let asset = assets[asset].repeat(32);
                    output(i as u32, known.then_some((value, asset.as_str())))
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_aggregate_ignores_order(outputs in arb_outputs(), seed in any::<u64>()) {
            let expected = aggregate_balances(&outputs);

            let mut shuffled = outputs.clone();
            shuffled.reverse();
            prop_assert_eq!(aggregate_balances(&shuffled), expected.clone());

            if !shuffled.is_empty() {
                let len = shuffled.len();
                shuffled.rotate_left((seed as usize) % len);
            }
            prop_assert_eq!(aggregate_balances(&shuffled), expected);
        }

        #[test]
        fn prop_aggregate_splits_additively(outputs in arb_outputs(), at in any::<usize>()) {
            let at = if outputs.is_empty() { 0 } else { at % outputs.len() };
            let (left, right) = outputs.split_at(at);

            let mut combined = aggregate_balances(left);
            for (asset, value) in aggregate_balances(right) {
                *combined.entry(asset).or_insert(0) += value;
            }
            prop_assert_eq!(combined, aggregate_balances(&outputs));
        }
    }
}
