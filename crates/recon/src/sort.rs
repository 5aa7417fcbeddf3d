use crate::model::Sale;

/// Order sales by `(token_id, transaction_hash)`.
///
/// Only affects presentation: the reconciler compares every pair, so the
/// order exists to keep printed reports stable between runs. The sort is
/// stable, so ties keep vendor order.
pub fn sort_sales(sales: &mut [Sale]) {
    sales.sort_by(|a, b| {
        a.token_id
            .cmp(&b.token_id)
            .then_with(|| a.transaction_hash.cmp(&b.transaction_hash))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Source, TokenId};

    fn sale(token: &str, hash: &str) -> Sale {
        Sale {
            source: Source::Defined,
            contract_address: "0xc".into(),
            token_id: TokenId::parse(token).unwrap(),
            price: "1".into(),
            maker: "0xm".into(),
            taker: "0xt".into(),
            transaction_hash: hash.into(),
            block_number: Some(1),
            timestamp: Some(1),
            log_index: None,
        }
    }

    fn keys(sales: &[Sale]) -> Vec<(String, String)> {
        sales
            .iter()
            .map(|s| (s.token_id.to_string(), s.transaction_hash.clone()))
            .collect()
    }

    #[test]
    fn sorts_token_numerically_then_hash() {
        let mut sales = vec![sale("10", "0xa"), sale("9", "0xb"), sale("9", "0xa"), sale("100", "0x0")];
        sort_sales(&mut sales);
        assert_eq!(
            keys(&sales),
            [
                ("9".to_string(), "0xa".to_string()),
                ("9".to_string(), "0xb".to_string()),
                ("10".to_string(), "0xa".to_string()),
                ("100".to_string(), "0x0".to_string()),
            ]
        );
    }

    #[test]
    fn ties_keep_input_order() {
        let mut first = sale("1", "0xa");
        first.price = "first".into();
        let mut second = sale("1", "0xa");
        second.price = "second".into();
        let mut sales = vec![first, second];
        sort_sales(&mut sales);
        assert_eq!(sales[0].price, "first");
        assert_eq!(sales[1].price, "second");
    }
}
