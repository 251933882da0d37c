//! The demos behind the subcommands

use std::collections::HashMap;
use std::convert::Infallible;
use std::time::Duration;

use anyhow::Context;
use futures::stream::{self, BoxStream, StreamExt};

use plainbytes_util::cancel::CancellationSignal;
use plainbytes_util::sequence::{AsyncSequenceExt, SequenceError};
use plainbytes_util::typename::{formatted_name, formatted_name_of, TypeDescriptor};

use crate::config::SequenceConfig;

/// `0..count`, waiting `delay` before producing each element
fn numbers(count: u32, delay: Duration) -> BoxStream<'static, Result<u32, Infallible>> {
    stream::iter(0..count)
        .then(move |i| async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Ok(i)
        })
        .boxed()
}

/// Print the elements of a number sequence until it completes or is canceled
pub async fn sequence(cfg: &SequenceConfig) -> anyhow::Result<()> {
    log::info!(
        "Processing a sequence of {} elements of type {}",
        cfg.count,
        formatted_name_of::<u32>()
    );

    let signal = CancellationSignal::new();
    let timer = cfg.timeout_ms.map(|ms| {
        let signal = signal.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            log::info!("Timeout of {ms}ms reached; requesting cancellation");
            signal.request();
        })
    });

    let even_only = cfg.even_only;
    let mut processed = 0usize;
    let res = numbers(cfg.count, Duration::from_millis(cfg.step_delay_ms))
        .where_async(&signal, |i| !even_only || i % 2 == 0)
        .for_each_async(&signal, |i| {
            println!("#{i}");
            processed += 1;
            if cfg.cancel_at == Some(i) {
                log::info!("Reached element {i}; requesting cancellation");
                signal.request();
            }
            async { Ok(()) }
        })
        .await;

    if let Some(timer) = timer {
        timer.abort();
    }

    match res {
        Ok(()) => println!("completed after {processed} elements"),
        Err(SequenceError::Canceled | SequenceError::Propagated(SequenceError::Canceled)) => {
            log::warn!("Sequence canceled after {processed} elements");
            println!("canceled after {processed} elements");
        }
        Err(err) => return Err(err).context("sequence processing failed"),
    }
    Ok(())
}

/// Print the canonical name of every expression, or of a few Rust types if there are none
pub fn type_names(expressions: &[String]) -> anyhow::Result<()> {
    if expressions.is_empty() {
        let names = [
            formatted_name_of::<Vec<String>>(),
            formatted_name_of::<HashMap<String, Vec<u8>>>(),
            formatted_name_of::<Option<(u8, bool)>>(),
        ];
        for name in names {
            println!("{name}");
        }
        return Ok(());
    }

    for expr in expressions {
        let descriptor: TypeDescriptor = expr
            .parse()
            .with_context(|| format!("invalid type expression {expr:?}"))?;
        println!("{expr} => {}", formatted_name(Some(&descriptor)));
    }
    Ok(())
}
