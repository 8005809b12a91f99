use alioss::{Credential, RequestSignerV1, RequestSignerV4, SigningResource};
use alioss_core::crc64::{crc64, crc64_combine};
use alioss_core::{Context, SignRequest};
use criterion::criterion_group;
use criterion::criterion_main;
use criterion::Criterion;
use criterion::Throughput;
use once_cell::sync::Lazy;

criterion_group!(benches, bench_sign, bench_crc64);
criterion_main!(benches);

static RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("must success")
});

fn request() -> http::request::Parts {
    let mut req = http::Request::new("");
    *req.method_mut() = http::Method::GET;
    *req.uri_mut() = "https://examplebucket.oss-cn-hangzhou.aliyuncs.com/hello.txt"
        .parse()
        .expect("url must be valid");
    req.extensions_mut()
        .insert(SigningResource::new(Some("examplebucket"), Some("hello.txt")));
    req.into_parts().0
}

pub fn bench_sign(c: &mut Criterion) {
    let mut group = c.benchmark_group("sign");
    let cred = Credential::new("access_key_id", "access_key_secret");
    let ctx = Context::new();

    group.bench_function("v1", |b| {
        let s = RequestSignerV1::new();
        b.to_async(&*RUNTIME).iter(|| async {
            let mut parts = request();
            s.sign_request(&ctx, &mut parts, Some(&cred), None)
                .await
                .expect("must success")
        })
    });

    group.bench_function("v4", |b| {
        let s = RequestSignerV4::new("cn-hangzhou");
        b.to_async(&*RUNTIME).iter(|| async {
            let mut parts = request();
            s.sign_request(&ctx, &mut parts, Some(&cred), None)
                .await
                .expect("must success")
        })
    });

    group.finish();
}

pub fn bench_crc64(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc64");
    let data = vec![7u8; 1024 * 1024];
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("1MiB", |b| b.iter(|| crc64(&data)));
    group.bench_function("combine", |b| {
        let crc = crc64(&data);
        b.iter(|| crc64_combine(crc, crc, data.len() as u64))
    });

    group.finish();
}
