use std::{
    cell::{Cell, RefCell},
    sync::Arc,
};

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

use crate::{
    WeatherError, WeatherModel,
    display::{DisplayRow, display_rows},
    events::{EventChannel, PresenterEvent},
    provider::WeatherFetcher,
    units::{self, TemperatureUnit},
};

/// View-model between the weather client and whatever renders the list.
///
/// State sits in `Cell`/`RefCell`, so a presenter is `!Sync` and its futures are `!Send`:
/// every read and write happens on the one task that owns it. `refresh` only suspends at
/// the network call and touches state after it resumes on that task.
///
/// Overlapping refreshes are not sequenced. Whichever response completes last is the one
/// left in [`WeatherPresenter::current_model`], even if it was issued first.
#[derive(Debug)]
pub struct WeatherPresenter {
    fetcher: Arc<dyn WeatherFetcher>,
    current: RefCell<Option<WeatherModel>>,
    unit: Cell<TemperatureUnit>,
    events: EventChannel,
}

impl WeatherPresenter {
    pub fn new(fetcher: Arc<dyn WeatherFetcher>) -> Self {
        Self {
            fetcher,
            current: RefCell::new(None),
            unit: Cell::new(TemperatureUnit::default()),
            events: EventChannel::new(),
        }
    }

    pub fn subscribe(&self) -> UnboundedReceiver<PresenterEvent> {
        self.events.subscribe()
    }

    /// Fetch `city` and publish the outcome: a new model plus `DataUpdated`, or an `Error`
    /// event with the model left untouched. Exactly one event per call.
    ///
    /// The outcome is also returned for callers that prefer not to listen.
    pub async fn refresh(&self, city: &str) -> Result<(), WeatherError> {
        debug!(city, "refreshing");

        match self.fetcher.fetch(city).await {
            Ok(model) => {
                info!(city, name = %model.city_name, "observation updated");
                self.current.replace(Some(model));
                self.events.emit(PresenterEvent::DataUpdated);
                Ok(())
            }
            Err(err) => {
                info!(city, error = %err, "refresh failed");
                self.events.emit(PresenterEvent::Error(err.clone()));
                Err(err)
            }
        }
    }

    /// Changes the unit used by [`WeatherPresenter::display_rows`]. Emits nothing; the
    /// caller re-renders.
    pub fn set_unit(&self, unit: TemperatureUnit) {
        self.unit.set(unit);
    }

    pub fn toggle_unit(&self) -> TemperatureUnit {
        let unit = self.unit.get().toggled();
        self.unit.set(unit);
        unit
    }

    pub fn selected_unit(&self) -> TemperatureUnit {
        self.unit.get()
    }

    pub fn convert(&self, kelvin: f64, unit: TemperatureUnit) -> f64 {
        units::convert(kelvin, unit)
    }

    pub fn current_model(&self) -> Option<WeatherModel> {
        self.current.borrow().clone()
    }

    pub fn has_model(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// No rows until a model arrives, then the nine fixed rows in the selected unit.
    pub fn display_rows(&self) -> Vec<DisplayRow> {
        match self.current.borrow().as_ref() {
            Some(model) => display_rows(model, self.unit.get()).into(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        display::ROW_COUNT,
        model::fixtures::{london, named},
    };
    use async_trait::async_trait;
    use std::{collections::HashMap, sync::Mutex};
    use tokio::sync::oneshot;

    type Outcome = Result<WeatherModel, WeatherError>;

    /// Answers every call with the same outcome.
    #[derive(Debug)]
    struct FixedFetcher {
        outcome: Outcome,
        calls: Mutex<Vec<String>>,
    }

    impl FixedFetcher {
        fn new(outcome: Outcome) -> Arc<Self> {
            Arc::new(Self { outcome, calls: Mutex::new(Vec::new()) })
        }
    }

    #[async_trait]
    impl WeatherFetcher for FixedFetcher {
        async fn fetch(&self, city: &str) -> Outcome {
            self.calls.lock().unwrap().push(city.to_string());
            self.outcome.clone()
        }
    }

    /// Holds each city's response until the test releases it.
    #[derive(Debug, Default)]
    struct GatedFetcher {
        gates: Mutex<HashMap<String, oneshot::Receiver<Outcome>>>,
    }

    impl GatedFetcher {
        fn gate(&self, city: &str) -> oneshot::Sender<Outcome> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(city.to_string(), rx);
            tx
        }
    }

    #[async_trait]
    impl WeatherFetcher for GatedFetcher {
        async fn fetch(&self, city: &str) -> Outcome {
            let rx = self.gates.lock().unwrap().remove(city).expect("gate registered");
            rx.await.expect("gate released")
        }
    }

    fn transport_error() -> WeatherError {
        WeatherError::Transport("error sending request: connection refused".into())
    }

    #[tokio::test]
    async fn successful_refresh_stores_model_and_emits_once() {
        let fetcher = FixedFetcher::new(Ok(london()));
        let presenter = WeatherPresenter::new(fetcher.clone());
        let mut events = presenter.subscribe();

        presenter.refresh("London").await.unwrap();

        assert_eq!(presenter.current_model(), Some(london()));
        assert_eq!(events.try_recv().unwrap(), PresenterEvent::DataUpdated);
        assert!(events.try_recv().is_err());
        assert_eq!(*fetcher.calls.lock().unwrap(), vec!["London".to_string()]);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_model_and_emits_error() {
        let presenter = WeatherPresenter::new(FixedFetcher::new(Ok(london())));
        presenter.refresh("London").await.unwrap();

        let presenter = WeatherPresenter {
            fetcher: FixedFetcher::new(Err(transport_error())),
            ..presenter
        };
        let mut events = presenter.subscribe();

        let err = presenter.refresh("Nowhere").await.unwrap_err();

        assert_eq!(err, transport_error());
        assert_eq!(presenter.current_model(), Some(london()));
        assert_eq!(events.try_recv().unwrap(), PresenterEvent::Error(transport_error()));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn failed_first_refresh_leaves_no_model() {
        let presenter = WeatherPresenter::new(FixedFetcher::new(Err(WeatherError::NoData)));
        let mut events = presenter.subscribe();

        assert!(presenter.refresh("Nowhere").await.is_err());

        assert!(!presenter.has_model());
        assert!(presenter.display_rows().is_empty());
        assert_eq!(events.try_recv().unwrap(), PresenterEvent::Error(WeatherError::NoData));
    }

    #[tokio::test]
    async fn last_completion_wins() {
        let fetcher = Arc::new(GatedFetcher::default());
        let release_a = fetcher.gate("A");
        let release_b = fetcher.gate("B");
        let presenter = WeatherPresenter::new(fetcher.clone());
        let mut events = presenter.subscribe();

        let driver = async {
            // B's response arrives first...
            release_b.send(Ok(named("B"))).unwrap();
            while !presenter.has_model() {
                tokio::task::yield_now().await;
            }
            assert_eq!(presenter.current_model().unwrap().city_name, "B");

            // ...then A's, which was issued earlier.
            release_a.send(Ok(named("A"))).unwrap();
        };

        let (a, b, ()) = tokio::join!(presenter.refresh("A"), presenter.refresh("B"), driver);
        a.unwrap();
        b.unwrap();

        assert_eq!(presenter.current_model().unwrap().city_name, "A");
        assert_eq!(events.try_recv().unwrap(), PresenterEvent::DataUpdated);
        assert_eq!(events.try_recv().unwrap(), PresenterEvent::DataUpdated);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn unit_changes_do_not_emit() {
        let presenter = WeatherPresenter::new(FixedFetcher::new(Ok(london())));
        presenter.refresh("London").await.unwrap();
        let mut events = presenter.subscribe();

        assert_eq!(presenter.selected_unit(), TemperatureUnit::Fahrenheit);
        assert_eq!(presenter.display_rows()[0].text(), "44.9°F");

        presenter.set_unit(TemperatureUnit::Celsius);
        assert_eq!(presenter.display_rows()[0].text(), "7.2°C");

        assert_eq!(presenter.toggle_unit(), TemperatureUnit::Fahrenheit);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn rows_follow_current_model() {
        let presenter = WeatherPresenter::new(FixedFetcher::new(Ok(london())));
        assert!(presenter.display_rows().is_empty());

        presenter.refresh("London").await.unwrap();
        let rows = presenter.display_rows();
        assert_eq!(rows.len(), ROW_COUNT);
        assert_eq!(rows[1].text(), "light intensity drizzle");
    }

    #[test]
    fn convert_matches_formula() {
        let presenter = WeatherPresenter::new(FixedFetcher::new(Err(WeatherError::NoData)));

        let c = presenter.convert(280.32, TemperatureUnit::Celsius);
        let f = presenter.convert(280.32, TemperatureUnit::Fahrenheit);
        assert!((c - 7.17).abs() < 1e-9);
        assert!((f - 44.906).abs() < 1e-9);
    }
}
