use approx::assert_relative_eq;
use ndarray::{Array2, array};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sensei::Error;
use sensei::align::{self, DEFAULT_RADIUS, Metric};

fn random_walk(rng: &mut StdRng, frames: usize, dims: usize) -> Array2<f64> {
    let mut series = Array2::zeros((frames, dims));
    for d in 0..dims {
        let mut value = 90.0;
        for t in 0..frames {
            value += rng.gen_range(-5.0..5.0);
            series[(t, d)] = value;
        }
    }
    series
}

fn assert_valid_path(path: &[(usize, usize)], n: usize, m: usize) {
    assert_eq!(path.first(), Some(&(0, 0)));
    assert_eq!(path.last(), Some(&(n - 1, m - 1)));
    for step in path.windows(2) {
        let di = step[1].0 - step[0].0;
        let dj = step[1].1 - step[0].1;
        assert!(di <= 1 && dj <= 1 && di + dj >= 1, "bad step {:?}", step);
    }
}

#[test]
fn dtw_identical_ramp() {
    let result = align::dtw(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
    assert_eq!(result.distance, 0.0);
    assert_eq!(result.path, vec![(0, 0), (1, 1), (2, 2)]);
}

#[test]
fn dtw_time_stretched_copy() {
    // The second series holds every sample twice; warping absorbs it fully.
    let a = [0.0, 10.0, 20.0, 30.0];
    let b = [0.0, 0.0, 10.0, 10.0, 20.0, 20.0, 30.0, 30.0];
    let result = align::dtw(&a, &b);
    assert_eq!(result.distance, 0.0);
    assert_valid_path(&result.path, a.len(), b.len());
    assert_relative_eq!(result.normalized_distance, 0.0);
}

#[test]
fn dtw_vectors_matches_scalar_dtw_in_one_dimension() {
    let a = [3.0, 1.0, 4.0, 1.0, 5.0];
    let b = [2.0, 7.0, 1.0, 8.0];
    let scalar = align::dtw(&a, &b);

    let va = Array2::from_shape_vec((5, 1), a.to_vec()).unwrap();
    let vb = Array2::from_shape_vec((4, 1), b.to_vec()).unwrap();
    for metric in [Metric::Euclidean, Metric::Manhattan] {
        let vector = align::dtw_vectors(&va, &vb, metric).unwrap();
        assert_relative_eq!(vector.distance, scalar.distance, epsilon = 1e-12);
        assert_eq!(vector.path, scalar.path);
    }
}

#[test]
fn fastdtw_exact_on_short_series() {
    let a = array![[90.0, 170.0], [110.0, 160.0], [140.0, 150.0], [160.0, 145.0]];
    let b = array![[92.0, 168.0], [95.0, 165.0], [130.0, 152.0], [158.0, 140.0]];
    let exact = align::dtw_vectors(&a, &b, Metric::Euclidean).unwrap();
    let fast = align::fastdtw(&a, &b, Metric::Euclidean, DEFAULT_RADIUS).unwrap();
    assert_relative_eq!(fast.distance, exact.distance, epsilon = 1e-12);
    assert_eq!(fast.path, exact.path);
}

#[test]
fn fastdtw_long_random_walk() {
    let mut rng = StdRng::seed_from_u64(7);
    let a = random_walk(&mut rng, 400, 3);
    let b = random_walk(&mut rng, 350, 3);

    let exact = align::dtw_vectors(&a, &b, Metric::Euclidean).unwrap();
    let fast = align::fastdtw(&a, &b, Metric::Euclidean, DEFAULT_RADIUS).unwrap();

    assert_valid_path(&fast.path, 400, 350);
    assert!(fast.distance.is_finite());
    assert!(fast.distance >= exact.distance - 1e-9);
}

#[test]
fn fastdtw_custom_cost() {
    let a = array![[0.0], [1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0], [8.0], [9.0]];
    let squared = |x: ndarray::ArrayView1<'_, f64>, y: ndarray::ArrayView1<'_, f64>| {
        x.iter().zip(y.iter()).map(|(p, q)| (p - q).powi(2)).sum::<f64>()
    };
    let result = align::fastdtw_with(&a, &a, 1, squared).unwrap();
    assert_eq!(result.distance, 0.0);
    assert_eq!(result.path.len(), 10);
}

#[test]
fn series_from_rows_builds_matrix() {
    let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
    let series = align::series_from_rows(&rows).unwrap();
    assert_eq!(series.dim(), (3, 2));
    assert_eq!(series[(2, 1)], 6.0);

    let ragged = vec![vec![1.0, 2.0], vec![3.0]];
    assert!(matches!(
        align::series_from_rows(&ragged),
        Err(Error::DimensionMismatch { expected: 2, got: 1 })
    ));
}

#[test]
fn dimension_mismatch_reported() {
    let a = Array2::<f64>::zeros((4, 3));
    let b = Array2::<f64>::zeros((4, 2));
    assert!(align::dtw_vectors(&a, &b, Metric::Euclidean).is_err());
    assert!(align::fastdtw(&a, &b, Metric::Euclidean, 2).is_err());
    assert!(align::euclidean_distance(&[1.0, 2.0], &[1.0]).is_err());
}

#[test]
fn empty_series_incomparable() {
    let empty = Array2::<f64>::zeros((0, 2));
    let b = array![[1.0, 2.0]];
    assert!(align::fastdtw(&empty, &b, Metric::Euclidean, 1).unwrap().is_incomparable());
    assert!(align::dtw(&[], &[1.0]).is_incomparable());
    assert!(align::dtw_distance(&[1.0], &[]).is_infinite());
}
