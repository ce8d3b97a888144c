use std::env;

fn main() {
    // 告诉 cargo 在 build.rs 变化时重新运行
    println!("cargo:rerun-if-changed=build.rs");

    // 主机构建 (单元测试) 不需要任何板级链接配置
    let target_arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();
    if target_arch != "xtensa" {
        return;
    }

    // 配置 PSRAM 模式 (ESP32-S3-N16R8 使用 Octal PSRAM)
    println!("cargo:rustc-env=ESP_HAL_CONFIG_PSRAM_MODE=octal");

    // esp-hal 提供的链接脚本，仅作用于固件二进制
    println!("cargo:rustc-link-arg-bins=-Tlinkall.x");

    // 添加 ld 目录到链接路径（如果有自定义链接脚本）
    if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        println!("cargo:rustc-link-search={}/ld", manifest_dir);
    }
}
