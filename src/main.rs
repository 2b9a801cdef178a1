fn main() -> anyhow::Result<()> {
    focusboost_lib::run()
}
