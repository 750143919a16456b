use serde::{Deserialize, Serialize};

//represents a futures contract specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuturesContract {
    //root symbol (eg es, nq)
    pub symbol: String,

    //minimum price fluctuation
    pub tick_size: f64,

    //dollar value of one tick
    pub tick_value: f64,

    //dollar value of one full point move
    pub point_value: f64,

    //exchange where traded
    pub exchange: String,

    //currency denomination
    pub currency: String,
}

impl FuturesContract {
    pub fn new(
        symbol: String,
        tick_size: f64,
        tick_value: f64,
        point_value: f64,
        exchange: String,
        currency: String,
    ) -> Self {
        FuturesContract {
            symbol,
            tick_size,
            tick_value,
            point_value,
            exchange,
            currency,
        }
    }

    //converts a price difference to ticks
    pub fn price_to_ticks(&self, price_diff: f64) -> f64 {
        price_diff / self.tick_size
    }

    //dollar value of a price move for a single contract
    pub fn points_to_dollars(&self, points: f64) -> f64 {
        self.price_to_ticks(points) * self.tick_value
    }

    //helper to create an e-mini s&p 500 contract
    pub fn es() -> Self {
        FuturesContract::new(
            "ES".to_string(),
            0.25,  //tick_size
            12.50, //tick_value (0.25 * 50)
            50.0,  //point_value
            "CME".to_string(),
            "USD".to_string(),
        )
    }

    //helper to create an e-mini nasdaq-100 contract
    pub fn nq() -> Self {
        FuturesContract::new(
            "NQ".to_string(),
            0.25, //tick_size
            5.0,  //tick_value (0.25 * 20)
            20.0, //point_value
            "CME".to_string(),
            "USD".to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn es_point_is_fifty_dollars() {
        let es = FuturesContract::es();
        assert_eq!(es.price_to_ticks(1.0), 4.0);
        assert_eq!(es.points_to_dollars(1.0), es.point_value);
        assert_eq!(es.points_to_dollars(-10.0), -500.0);
    }

    #[test]
    fn nq_point_is_twenty_dollars() {
        let nq = FuturesContract::nq();
        assert_eq!(nq.points_to_dollars(20.0), 400.0);
    }
}
